//! Catalogue table with live filtering and drag-to-resize columns.
//!
//! The resize and filter logic (`columns`, `filter`, `pointer`, `listeners`,
//! `observer`) is independent of the terminal front end (`controller`,
//! `model`, `ui`).

pub mod columns;
pub mod controller;
pub mod domain;
pub mod filter;
pub mod inputter;
pub mod listeners;
pub mod model;
pub mod observer;
pub mod pointer;
pub mod table;
pub mod ui;
