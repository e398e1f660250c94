//! Build execution.
//!
//! The runner consumes a pipeline spec in a single pass: validate, then for
//! each target run its transform stages in declared order, run the output's
//! post stages, and write the bundle. Stage implementations live behind the
//! [`StageExecutor`] trait; the compiler and minifier are external
//! collaborators registered by the embedder, not implemented here. Only
//! entry resolution ships builtin, because the exactly-one-module invariant
//! is the runner's to enforce.

use crate::build::{
    check_executors, resolve_entry, validate_spec, BuildContext, BuildResult, TargetResult,
    ValidationIssue,
};
use crate::descriptor::{PipelineSpec, StageSpec, TargetDescriptor};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// The value flowing from stage to stage: the code produced so far and the
/// sourcemap, when some stage generated one.
#[derive(Debug, Clone, Default)]
pub struct Artifact {
    /// Path of the module the artifact was produced from
    pub source: PathBuf,
    /// Current code
    pub code: String,
    /// Sourcemap contents, if a stage produced one
    pub sourcemap: Option<String>,
}

impl Artifact {
    /// Seed an artifact from a declared entry path. No code yet; the
    /// resolve stage fills it in.
    pub fn entry(source: PathBuf) -> Self {
        Self { source, code: String::new(), sourcemap: None }
    }
}

/// One stage implementation.
///
/// Executors are registered under a stage kind name and applied to the
/// artifact in declared stage order.
pub trait StageExecutor: Send + Sync {
    /// The stage kind name this executor handles.
    fn kind(&self) -> &str;

    /// Apply the stage to the artifact.
    fn apply(
        &self,
        artifact: Artifact,
        stage: &StageSpec,
        ctx: &BuildContext,
    ) -> Result<Artifact, String>;
}

/// Builtin entry resolution stage.
///
/// Resolves the artifact's source path to exactly one module (probing the
/// stage's `extensions` option, falling back to the config default list)
/// and loads its contents.
pub struct ResolveExecutor;

impl StageExecutor for ResolveExecutor {
    fn kind(&self) -> &str {
        "resolve"
    }

    fn apply(
        &self,
        artifact: Artifact,
        stage: &StageSpec,
        ctx: &BuildContext,
    ) -> Result<Artifact, String> {
        let extensions = stage
            .str_list_option("extensions")
            .unwrap_or_else(|| ctx.default_extensions().to_vec());

        let resolved = resolve_entry(ctx.project_root(), &artifact.source, &extensions)
            .map_err(|e| e.to_string())?;
        let code = fs::read_to_string(&resolved)
            .map_err(|e| format!("Failed to read {}: {}", resolved.display(), e))?;

        Ok(Artifact { source: resolved, code, sourcemap: artifact.sourcemap })
    }
}

/// Registry of stage executors, keyed by stage kind name.
pub struct ExecutorRegistry {
    executors: HashMap<String, Box<dyn StageExecutor>>,
}

impl ExecutorRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self { executors: HashMap::new() }
    }

    /// Create a registry with the builtin executors registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ResolveExecutor));
        registry
    }

    /// Register an executor. Replaces any executor already registered for
    /// the same kind.
    pub fn register(&mut self, executor: Box<dyn StageExecutor>) {
        self.executors.insert(executor.kind().to_string(), executor);
    }

    /// Check whether an executor is registered for a kind name.
    pub fn contains(&self, kind: &str) -> bool {
        self.executors.contains_key(kind)
    }

    /// Look up the executor for a kind name.
    pub fn get(&self, kind: &str) -> Option<&dyn StageExecutor> {
        self.executors.get(kind).map(|e| e.as_ref())
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Error during build execution.
#[derive(Debug)]
pub enum BuildError {
    /// The descriptor failed validation
    Invalid(Vec<ValidationIssue>),
    /// IO error
    Io(std::io::Error),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Invalid(issues) => {
                writeln!(f, "Pipeline validation failed:")?;
                for issue in issues {
                    writeln!(f, "  - {}", issue)?;
                }
                Ok(())
            }
            BuildError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<std::io::Error> for BuildError {
    fn from(e: std::io::Error) -> Self {
        BuildError::Io(e)
    }
}

/// Build runner consuming a pipeline spec.
pub struct BuildRunner {
    /// Build context
    context: BuildContext,
    /// Stage executors
    registry: ExecutorRegistry,
    /// Whether to stop on first error
    fail_fast: bool,
    /// Whether to do a dry run (don't execute stages or write outputs)
    dry_run: bool,
    /// Number of parallel jobs
    jobs: usize,
}

impl BuildRunner {
    /// Create a new runner with the builtin executor registry.
    pub fn new(context: BuildContext) -> Self {
        Self {
            context,
            registry: ExecutorRegistry::default(),
            fail_fast: false,
            dry_run: false,
            jobs: 1,
        }
    }

    /// Replace the executor registry.
    pub fn with_registry(mut self, registry: ExecutorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register an additional executor.
    pub fn with_executor(mut self, executor: Box<dyn StageExecutor>) -> Self {
        self.registry.register(executor);
        self
    }

    /// Set fail-fast mode (stop on first error).
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set dry-run mode (don't execute stages or write outputs).
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the number of parallel jobs. Targets are independent, so any
    /// number of them may run at once.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Get the executor registry.
    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Get the build context.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Run the build.
    ///
    /// Constructs the pipeline spec from the context, validates it, and
    /// executes it. Validation failures are returned as
    /// [`BuildError::Invalid`] without executing anything.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let spec = self.context.pipeline();

        let mut issues = validate_spec(&spec, &self.context);
        issues.extend(check_executors(&spec, &self.registry));
        if !issues.is_empty() {
            return Err(BuildError::Invalid(issues));
        }

        let mut result = self.execute_spec(&spec);
        result.total_duration = start.elapsed();
        Ok(result)
    }

    /// Run the build with a pre-constructed spec, skipping validation.
    pub fn build_spec(&self, spec: &PipelineSpec) -> BuildResult {
        let start = Instant::now();
        let mut result = self.execute_spec(spec);
        result.total_duration = start.elapsed();
        result
    }

    fn execute_spec(&self, spec: &PipelineSpec) -> BuildResult {
        let targets = spec.targets();

        if self.context.is_verbose() {
            println!("Pipeline: {} target(s), {} job(s)", targets.len(), self.jobs);
            for target in targets {
                println!("  - {} ({})", target.name, target.output.format);
            }
        }

        if self.jobs > 1 && targets.len() > 1 {
            self.execute_parallel(targets)
        } else {
            self.execute_sequential(targets)
        }
    }

    fn execute_sequential(&self, targets: &[TargetDescriptor]) -> BuildResult {
        let mut result = BuildResult::new();

        for target in targets {
            let target_result = self.execute_target(target);
            let failed = target_result.status.is_failure();
            result.add_result(target_result);

            if failed && self.fail_fast {
                break;
            }
        }

        result
    }

    /// Execute targets on a worker pool.
    ///
    /// Targets are handed out through a shared index; results are re-sorted
    /// into declaration order so output is deterministic regardless of
    /// which worker finished first.
    fn execute_parallel(&self, targets: &[TargetDescriptor]) -> BuildResult {
        let results = Mutex::new(Vec::with_capacity(targets.len()));
        let next_idx = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let num_workers = self.jobs.min(targets.len());

        std::thread::scope(|s| {
            for _ in 0..num_workers {
                s.spawn(|| loop {
                    if self.fail_fast && failed.load(Ordering::SeqCst) {
                        break;
                    }

                    let idx = next_idx.fetch_add(1, Ordering::SeqCst);
                    if idx >= targets.len() {
                        break;
                    }

                    let target_result = self.execute_target(&targets[idx]);
                    if target_result.status.is_failure() && self.fail_fast {
                        failed.store(true, Ordering::SeqCst);
                    }

                    results.lock().unwrap().push((idx, target_result));
                });
            }
        });

        let mut collected = results.into_inner().unwrap();
        collected.sort_by_key(|(idx, _)| *idx);

        let mut result = BuildResult::new();
        for (_, target_result) in collected {
            result.add_result(target_result);
        }
        result
    }

    /// Execute a single target.
    fn execute_target(&self, target: &TargetDescriptor) -> TargetResult {
        let start = Instant::now();

        if self.context.is_verbose() {
            println!("Bundling: {} ...", target.name);
        }

        if self.dry_run {
            return TargetResult::skipped(target.name.clone());
        }

        let mut artifact = Artifact::entry(target.entry.clone());

        // Transform stages, then post stages, in declared order.
        for stage in target.stages.iter().chain(target.output.post.iter()) {
            artifact = match self.apply_stage(stage, artifact, target) {
                Ok(a) => a,
                Err(e) => {
                    if self.context.is_verbose() {
                        println!("  Failed: {}", e);
                    }
                    return TargetResult::failed(target.name.clone(), e, start.elapsed());
                }
            };
        }

        match self.write_output(target, artifact) {
            Ok((outputs, warnings)) => {
                let duration = start.elapsed();
                if self.context.is_verbose() {
                    println!("  Done in {:?}", duration);
                }
                TargetResult::success(target.name.clone(), outputs, duration)
                    .with_warnings(warnings)
            }
            Err(e) => {
                if self.context.is_verbose() {
                    println!("  Failed: {}", e);
                }
                TargetResult::failed(target.name.clone(), e, start.elapsed())
            }
        }
    }

    fn apply_stage(
        &self,
        stage: &StageSpec,
        artifact: Artifact,
        target: &TargetDescriptor,
    ) -> Result<Artifact, String> {
        let kind = stage.kind.to_string();
        let executor = self
            .registry
            .get(&kind)
            .ok_or_else(|| format!("No executor registered for stage kind '{}'", kind))?;

        executor.apply(artifact, stage, &self.context).map_err(|e| {
            format!("Stage '{}' failed for target '{}': {}", kind, target.name, e)
        })
    }

    /// Write the bundle and, when requested and produced, its sourcemap.
    fn write_output(
        &self,
        target: &TargetDescriptor,
        mut artifact: Artifact,
    ) -> Result<(Vec<PathBuf>, Vec<String>), String> {
        let dest = self.context.resolve_path(&target.output.file);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create output directory: {}", e))?;
        }

        let mut outputs = Vec::new();
        let mut warnings = Vec::new();

        let map_path = target.output.sourcemap.then(|| {
            let mut name: OsString = dest.as_os_str().to_os_string();
            name.push(".map");
            PathBuf::from(name)
        });

        if let Some(map_path) = &map_path {
            match artifact.sourcemap.take() {
                Some(map) => {
                    let map_name = map_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    if !artifact.code.ends_with('\n') {
                        artifact.code.push('\n');
                    }
                    artifact.code.push_str(&format!("//# sourceMappingURL={}\n", map_name));

                    fs::write(map_path, map)
                        .map_err(|e| format!("Failed to write {}: {}", map_path.display(), e))?;
                }
                None => {
                    warnings.push(format!(
                        "target '{}': sourcemap requested but no stage produced one",
                        target.name
                    ));
                }
            }
        }

        fs::write(&dest, &artifact.code)
            .map_err(|e| format!("Failed to write {}: {}", dest.display(), e))?;
        outputs.push(dest);
        if let Some(map_path) = map_path {
            if map_path.exists() {
                outputs.push(map_path);
            }
        }

        Ok((outputs, warnings))
    }
}
