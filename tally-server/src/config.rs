use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub photo_max_dimension: u32,
    pub photo_jpeg_quality: u8,
    pub snapshot_channel_capacity: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            photo_max_dimension: env::var("PHOTO_MAX_DIMENSION")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .expect("Invalid PHOTO_MAX_DIMENSION"),
            photo_jpeg_quality: env::var("PHOTO_JPEG_QUALITY")
                .unwrap_or_else(|_| "70".to_string())
                .parse()
                .expect("Invalid PHOTO_JPEG_QUALITY"),
            snapshot_channel_capacity: env::var("SNAPSHOT_CHANNEL_CAPACITY")
                .unwrap_or_else(|_| "32".to_string())
                .parse()
                .expect("Invalid SNAPSHOT_CHANNEL_CAPACITY"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
