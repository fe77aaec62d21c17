#![doc = include_str!("../README.md")]

#[macro_use]
extern crate log;

mod canvas;
mod cli;
mod config;
mod danmu;
mod drawable;
mod input_type;
mod overlay;
mod source;
mod store;
mod surface;
mod term;
mod xml_parser;

pub use canvas::{Canvas, Config as CanvasConfig};
pub use cli::Args;
pub use config::{ConfigPatch, ConfigStore, OverlayConfig};
pub use danmu::{Danmu, DanmuType};
pub use drawable::Drawable;
pub use input_type::InputType;
pub use overlay::Overlay;
pub use store::DanmuStore;
pub use surface::Surface;
pub use xml_parser::Parser;
