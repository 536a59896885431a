use std::future::Future;
use std::pin::Pin;

use crate::core::ChartId;

/// Host hook asking for another frame so a freshly cached bitmap gets
/// composited.
pub trait RedrawSignal {
    fn request_redraw(&self, chart_id: ChartId);
}

impl<F> RedrawSignal for F
where
    F: Fn(ChartId),
{
    fn request_redraw(&self, chart_id: ChartId) {
        self(chart_id);
    }
}

/// Detached render job; runs on the UI thread, so it is not `Send`.
pub type RenderTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs render jobs cooperatively on the thread that draws frames.
pub trait LocalSpawner {
    fn spawn_local(&self, task: RenderTask);
}

/// Spawns onto the current tokio `LocalSet`.
///
/// Must be used from within `LocalSet::run_until` or a task spawned on a
/// `LocalSet`; tokio panics otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLocalSpawner;

impl LocalSpawner for TokioLocalSpawner {
    fn spawn_local(&self, task: RenderTask) {
        // detached: completion is observed through the registry
        drop(tokio::task::spawn_local(task));
    }
}
