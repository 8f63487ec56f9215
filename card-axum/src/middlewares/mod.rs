pub mod https;

pub use https::redirect_to_https;
