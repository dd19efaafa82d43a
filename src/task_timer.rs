/// Coarse timing for batch operations (tree rebuilds, layout runs, span
/// extraction). These all have to stay sub-frame, so the timings are printed
/// where they are easy to notice during development.
pub struct TaskTimer {
    start_time: std::time::Instant,
    task_name: String,
}

impl TaskTimer {
    pub fn new(task_name: impl AsRef<str>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            task_name: task_name.as_ref().to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    pub fn stop(&self) {
        println!("Task: {} finished in {:.1}ms", self.task_name, self.elapsed_ms());
    }

    /// Same as [TaskTimer::stop] but records how many items the task processed.
    pub fn stop_with_count(&self, count: usize) {
        println!(
            "Task: {} finished in {:.1}ms ({} items)",
            self.task_name,
            self.elapsed_ms(),
            count
        );
    }
}
