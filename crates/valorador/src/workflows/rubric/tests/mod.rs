mod common;
mod export;
mod session;
