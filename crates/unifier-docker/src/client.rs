use std::path::Path;

use unifier_core::{BuildUnit, Config};

use crate::docker::DockerError;
use crate::executor::{DockerExecutor, Invocation, RealExecutor};

/// Container tool operations, parameterized over the executor for testability.
///
/// In dry-run mode every command is echoed and none reaches the executor.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
    tool: String,
    dry_run: bool,
}

impl DockerClient<RealExecutor> {
    pub fn new(cfg: &Config) -> Self {
        Self::with_executor(RealExecutor::new(cfg.command_timeout), cfg)
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E, cfg: &Config) -> Self {
        Self {
            executor,
            tool: cfg.tool.clone(),
            dry_run: cfg.dry_run,
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    // ── Command execution ──

    /// Echo `invocation` and run it, unless in dry-run mode.
    pub async fn run(&self, invocation: &Invocation) -> Result<(), DockerError> {
        println!("$ {invocation}");
        if self.dry_run {
            return Ok(());
        }
        tracing::debug!(
            command = %invocation,
            cwd = ?invocation.cwd,
            "running command"
        );
        self.executor.run(invocation).await
    }

    /// Fail early if the tool cannot be found. Also checked in dry-run mode.
    pub fn check_tool_available(&self) -> Result<(), DockerError> {
        if self.executor.is_available(&self.tool) {
            Ok(())
        } else {
            Err(DockerError::ToolNotFound {
                tool: self.tool.clone(),
            })
        }
    }

    // ── Commands ──

    /// `build -t <image> .` with `context` as working directory.
    pub fn build_invocation(&self, image: &str, context: &Path) -> Invocation {
        Invocation::new(&self.tool, ["build", "-t", image, "."]).current_dir(context)
    }

    /// `tag <source> <target>`
    pub fn tag_invocation(&self, source: &str, target: &str) -> Invocation {
        Invocation::new(&self.tool, ["tag", source, target])
    }

    /// `push <reference>`
    pub fn push_invocation(&self, reference: &str) -> Invocation {
        Invocation::new(&self.tool, ["push", reference])
    }

    // ── Pipeline steps ──

    /// Build one image per unit, in order, tagged with the bare unit name.
    ///
    /// Stops at the first failing build.
    pub async fn build_base_images(
        &self,
        units: &[BuildUnit],
    ) -> Result<Vec<Invocation>, DockerError> {
        let mut issued = Vec::with_capacity(units.len());
        for unit in units {
            let invocation = self.build_invocation(&unit.image_name, &unit.context_path);
            self.run(&invocation).await?;
            issued.push(invocation);
        }
        Ok(issued)
    }

    /// Build the unified image from the project root as `unified_ref`.
    pub async fn build_unified_image(&self, cfg: &Config) -> Result<Invocation, DockerError> {
        let invocation = self.build_invocation(&cfg.unified_ref(), &cfg.project_dir);
        self.run(&invocation).await?;
        Ok(invocation)
    }

    /// Tag `unified_ref` as `target_ref`, then push `target_ref`.
    ///
    /// The push is not attempted when tagging fails.
    pub async fn tag_and_push(&self, cfg: &Config) -> Result<Vec<Invocation>, DockerError> {
        let target = cfg.target_ref();
        let tag = self.tag_invocation(&cfg.unified_ref(), &target);
        self.run(&tag).await?;
        let push = self.push_invocation(&target);
        self.run(&push).await?;
        Ok(vec![tag, push])
    }
}
