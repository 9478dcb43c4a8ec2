// File: ./src/model/mod.rs
pub mod display;
pub mod item;
pub mod parser;

pub use item::{
    Category, HistoryAction, HistoryEntry, Installation, InstallationDraft, Priority, Shipment,
    ShipmentDraft, Task, TaskDraft, TaskStatus, TaskType,
};
pub use parser::{ParseContext, ParseResult, ParseRules, StructuredForm};
