mod rest;

pub use rest::{parse_fx_intraday, split_pair, AlphaVantageClient, BASE_URL};
