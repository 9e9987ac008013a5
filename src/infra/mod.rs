pub mod game_prices;
