#![allow(clippy::too_many_arguments)]
#![allow(clippy::large_enum_variant)]

#[macro_use]
pub mod logger;
pub mod app;
pub mod canvas;
pub mod cli;
pub mod editor;
pub mod geom;
pub mod input;
pub mod io;
pub mod ops;
pub mod raster;
pub mod settings;
pub mod sprite;
pub mod sprite_list;
pub mod text;
