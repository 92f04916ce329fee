//! Webcam-style fruit minigames for the terminal, plus the pieces the
//! launcher needs to run them as child processes.

pub mod assets;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod error;
pub mod event;
pub mod games;
pub mod landmarks;
pub mod launcher;
pub mod logging;
pub mod objects;
pub mod physics;
pub mod runner;
pub mod session;
pub mod spawner;
