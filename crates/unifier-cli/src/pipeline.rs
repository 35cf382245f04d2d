use std::fmt;

use unifier_build::{FileUpdate, PatchError, update_final_files};
use unifier_core::{Config, discover_build_units, validate_structure};
use unifier_docker::{DockerClient, DockerError, DockerExecutor, Invocation};

/// Pipeline states reached by a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ToolChecked,
    StructureValidated,
    Built,
    BuildSkipped,
    FilesUpdated,
    UpdateSkipped,
    Published,
    PublishSkipped,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ToolChecked => "tool checked",
            Self::StructureValidated => "structure validated",
            Self::Built => "built",
            Self::BuildSkipped => "build skipped",
            Self::FilesUpdated => "files updated",
            Self::UpdateSkipped => "update skipped",
            Self::Published => "published",
            Self::PublishSkipped => "publish skipped",
        };
        f.write_str(label)
    }
}

/// Result of a successful pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub stages: Vec<Stage>,
    /// Every command issued, in order (echoed only, in dry-run mode)
    pub commands: Vec<Invocation>,
    pub file_update: Option<FileUpdate>,
    pub unified_ref: String,
    pub target_ref: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] unifier_core::Error),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Docker(#[from] DockerError),
}

/// Run the pipeline: tool check → structure → build → update files → publish.
///
/// The tool check and structure validation always run; the other steps
/// honor `skip_build`, `skip_update_files` and `do_push`. The first failure
/// ends the run.
pub async fn run_pipeline<E: DockerExecutor>(
    cfg: &Config,
    client: &DockerClient<E>,
) -> Result<PipelineOutcome, PipelineError> {
    print_summary(cfg);

    let mut stages = Vec::new();
    let mut commands = Vec::new();

    client.check_tool_available()?;
    stages.push(Stage::ToolChecked);

    validate_structure(cfg)?;
    stages.push(Stage::StructureValidated);

    if cfg.skip_build {
        println!("==> Skipping builds");
        stages.push(Stage::BuildSkipped);
    } else {
        println!("==> Building base images");
        let units = discover_build_units(&cfg.project_dir)?;
        if units.is_empty() {
            tracing::warn!(
                project_dir = %cfg.project_dir.display(),
                "no subdirectory with a Dockerfile; no base images to build"
            );
        }
        commands.extend(client.build_base_images(&units).await?);

        println!("==> Building unified image");
        commands.push(client.build_unified_image(cfg).await?);
        stages.push(Stage::Built);
    }

    let file_update = if cfg.skip_update_files {
        println!("==> Skipping final file update");
        stages.push(Stage::UpdateSkipped);
        None
    } else {
        println!("==> Updating final directory files");
        let update = update_final_files(cfg)?;
        if update.written {
            println!(
                "Updated: {} and {}",
                update.dockerfile.display(),
                update.compose.display()
            );
        } else {
            println!("Would update {} -> {}", update.dockerfile.display(), update.from_line);
            println!("Would update {} -> image: {}", update.compose.display(), update.image);
        }
        stages.push(Stage::FilesUpdated);
        Some(update)
    };

    if cfg.do_push {
        println!("==> Tagging and pushing to the registry");
        commands.extend(client.tag_and_push(cfg).await?);
        stages.push(Stage::Published);
    } else {
        println!("==> Skipping push (--no-push)");
        stages.push(Stage::PublishSkipped);
    }

    let outcome = PipelineOutcome {
        stages,
        commands,
        file_update,
        unified_ref: cfg.unified_ref(),
        target_ref: cfg.target_ref(),
    };

    println!("Pipeline finished successfully.");
    println!("Unified image: {}", outcome.unified_ref);
    println!("Registry target: {}", outcome.target_ref);

    Ok(outcome)
}

fn print_summary(cfg: &Config) {
    println!("Configuration:");
    println!("  base_dir     = {}", cfg.base_dir.display());
    println!("  project_dir  = {}", cfg.project_dir.display());
    println!("  final_dir    = {}", cfg.final_dir.display());
    println!("  project_name = {}", cfg.project_name);
    println!("  registry     = {}", cfg.registry);
    println!(
        "  tag_strategy = {} (tag={})",
        cfg.tag_strategy,
        cfg.tag_value()
    );
    println!("  push         = {}", cfg.do_push);
    if cfg.dry_run {
        println!("  dry_run      = true");
    }
}
