mod common;
mod risk;
mod scoring;
