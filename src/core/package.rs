//! Package runtime
//!
//! Binds one package name to its manifest configuration and the matching
//! builder, and turns backend status into progress lines.

use std::sync::Arc;

use futures::StreamExt;

use crate::core::builder::{builder_for, BuildContext, BuildEvent, Builder, EventStream};
use crate::core::manifest::ManifestStore;
use crate::error::CackleError;

/// Receives `(package, line)` progress lines
pub type ProgressSink = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// A sink that discards everything
pub fn silent() -> ProgressSink {
    Arc::new(|_, _| {})
}

/// One package of the current invocation
pub struct PackageRuntime<'a> {
    name: String,
    store: &'a ManifestStore,
    ctx: &'a BuildContext,
    progress: ProgressSink,
}

impl<'a> PackageRuntime<'a> {
    pub fn new(
        name: impl Into<String>,
        store: &'a ManifestStore,
        ctx: &'a BuildContext,
        progress: ProgressSink,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            ctx,
            progress,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn builder(&self) -> Result<Box<dyn Builder>, CackleError> {
        let config = self.store.resolve(&self.name)?;
        Ok(builder_for(&config, self.ctx)?)
    }

    /// Build once; returns a summary line
    pub async fn build(&self) -> Result<String, CackleError> {
        let builder = self.builder()?;
        let outcome = builder.build(&self.name).await?;

        for line in &outcome.log {
            tracing::info!("[{}] {line}", self.name);
        }

        let output_dir = outcome
            .output_dir
            .strip_prefix(self.ctx.workspace.root())
            .unwrap_or(&outcome.output_dir)
            .display()
            .to_string();
        Ok(format!("built with {} into {output_dir}", outcome.system))
    }

    /// Watch until the backend stops or fails
    pub async fn watch(&self) -> Result<String, CackleError> {
        let builder = self.builder()?;
        self.follow(builder.watch(&self.name)).await
    }

    /// Serve on `port` until the backend stops or fails
    pub async fn serve(&self, port: u16) -> Result<String, CackleError> {
        let builder = self.builder()?;
        self.follow(builder.serve(&self.name, port)).await
    }

    async fn follow(&self, mut events: EventStream) -> Result<String, CackleError> {
        let mut rebuilds = 0usize;

        while let Some(event) = events.next().await {
            let event = event?;
            if matches!(event, BuildEvent::Rebuilt { .. }) {
                rebuilds += 1;
            }
            (self.progress)(&self.name, &describe(&event));
        }

        Ok(format!("stopped after {rebuilds} rebuild(s)"))
    }
}

/// Human-readable form of a backend event
pub fn describe(event: &BuildEvent) -> String {
    match event {
        BuildEvent::Output(line) => line.clone(),
        BuildEvent::Rebuilt { success: true } => "rebuilt".to_string(),
        BuildEvent::Rebuilt { success: false } => "rebuild failed".to_string(),
        BuildEvent::Listening { url } => format!("listening on {url}"),
    }
}
