mod helpers;
mod mocks;

mod misc;
mod pixel_data;
mod polling;
mod webhook;
