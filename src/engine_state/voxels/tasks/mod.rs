//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation. These tasks are
//! processed by the task manager so chunk loading does not stall the world loop.

pub mod chunk_generation_task;
