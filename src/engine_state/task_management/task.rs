//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work asynchronously across multiple threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread (or inline)
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the driving thread
//! 5. The result can spawn new tasks or submit geometry to the mesh sink
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the driving thread
//! - Tasks share the world only through the internally synchronized `ChunkRegistry`

use crate::engine_state::rendering::MeshSink;

/// A unit of work that can be executed off the driving thread.
///
/// Tasks should own everything they need, typically an `Arc` of the registry
/// plus the coordinate or chunk they work on.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// This runs on a worker thread. Failures are carried inside the result
    /// rather than panicking.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be handled on the driving thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
///
/// Results are handled on the driving thread, where they may hand geometry to
/// the rendering collaborator and schedule follow-up work.
pub trait TaskResult: Send {
    /// Handles the result of a completed task.
    ///
    /// # Arguments
    /// * `sink` - Receives any geometry the task produced
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty)
    fn handle_result(self: Box<Self>, sink: &mut dyn MeshSink) -> Vec<Box<dyn Task + Send>>;
}
