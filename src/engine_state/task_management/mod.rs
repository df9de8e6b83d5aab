//! # Task Management System
//!
//! This module provides a task management system for executing chunk generation
//! and meshing work across a pool of worker threads, or inline on the driving
//! thread when no workers are configured.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the driving thread and a worker thread
//!
//! ## Execution Modes
//!
//! ### Worker Pool
//! - Uses `std::thread` for true multi-threading
//! - Each worker has a dedicated channel for task distribution
//! - At most `MAX_TASKS_IN_FLIGHT` tasks are handed to a worker at once; the rest wait
//!   in a FIFO queue
//!
//! ### Inline (`num_workers == 0`)
//! - Queued tasks are processed on the calling thread during `process_queued_tasks()`
//! - Results are handled on the next `process_completed_tasks()`, exactly as worker
//!   results are, so one tick behaves the same in both modes
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and return results
//! 4. Results are handled on the driving thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks or submit geometry to a `MeshSink`
//! 6. The cycle continues until all work is complete
//!
//! ## Example Usage
//! ```rust
//! use voxel_terrain::engine_state::{
//!     rendering::CollectingMeshSink,
//!     task_management::TaskManager,
//! };
//!
//! let mut task_manager = TaskManager::new(0);
//! let mut sink = CollectingMeshSink::default();
//!
//! // In the world loop:
//! task_manager.process_completed_tasks(&mut sink);
//! task_manager.process_queued_tasks();
//! assert!(task_manager.is_idle());
//! ```

pub mod task;

use log::{info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

use super::rendering::MeshSink;

/// A communication channel between the driving thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the driving thread to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `alive`: Cleared once the worker has gone away
/// - `_worker`: Handle to the worker thread (kept alive by this struct)
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    alive: bool,
    _worker: JoinHandle<()>,
}

impl TaskChannel {
    fn accepts_tasks(&self) -> bool {
        self.alive && self.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `inline_results`: Results of tasks processed inline, not yet handled
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    inline_results: VecDeque<Box<dyn TaskResult + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// This is set to 1 to ensure tasks are processed in order within each channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. `0` processes tasks
    ///   inline on the thread that calls `process_queued_tasks()`.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {} task workers (available parallelism: {:?})",
                num_workers,
                thread::available_parallelism()
            );
        }

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                alive: true,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            inline_results: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads (0 when running inline).
    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Whether there is no queued, in-flight or unhandled work.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty()
            && self.inline_results.is_empty()
            && self
                .channels
                .iter()
                .all(|channel| !channel.alive || channel.num_tasks_in_flight == 0)
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker has disconnected, so the task can be requeued
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                warn!("Task worker {} disconnected", channel_idx);
                channel.alive = false;
                Err(task.0)
            }
        }
    }

    /// Finds an available worker channel, round-robin from the last one used.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel that can accept a new task
    /// - `None` if all channels are busy or gone
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|step| (self.current_channel + step) % len)
            .find(|&idx| self.channels[idx].accepts_tasks())
    }

    /// Publishes a new task for execution.
    ///
    /// The task is sent to a worker as soon as one is available, otherwise it is
    /// queued. Never blocks.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on a worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Schedules queued tasks onto available workers, or processes them inline
    /// when there are no workers.
    ///
    /// Tasks are taken in FIFO order; scheduling stops at the first task that
    /// cannot be placed.
    pub fn process_queued_tasks(&mut self) {
        if self.channels.is_empty() {
            while let Some(task) = self.queued_tasks.pop_front() {
                self.inline_results.push_back(task.process());
            }
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }

        if self.channels.iter().all(|channel| !channel.alive) && !self.queued_tasks.is_empty() {
            warn!(
                "All task workers are gone, processing {} tasks inline",
                self.queued_tasks.len()
            );
            while let Some(task) = self.queued_tasks.pop_front() {
                self.inline_results.push_back(task.process());
            }
        }
    }

    /// Handles every completed task result.
    ///
    /// Must be called on the driving thread. Results may submit geometry to
    /// `sink`; any follow-up tasks they return are published.
    pub fn process_completed_tasks(&mut self, sink: &mut dyn MeshSink) {
        let mut results = Vec::new();
        results.extend(self.inline_results.drain(..));

        for (idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        results.push(result);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.alive {
                            warn!("Task worker {} stopped with {} tasks in flight", idx, channel.num_tasks_in_flight);
                        }
                        channel.alive = false;
                        channel.num_tasks_in_flight = 0;
                        break;
                    }
                }
            }
        }

        let mut tasks_to_queue = Vec::new();
        for result in results {
            tasks_to_queue.extend(result.handle_result(sink));
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }
}
