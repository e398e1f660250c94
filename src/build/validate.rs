//! Pipeline descriptor validation.
//!
//! The descriptor itself never fails construction; the runner validates it
//! before executing anything. Every problem found is reported, not just the
//! first.

use crate::build::{resolve_entry, BuildContext, ExecutorRegistry};
use crate::descriptor::{PipelineSpec, StageKind, TargetDescriptor};
use std::collections::HashMap;

/// A single validation problem in a pipeline descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Descriptor field the issue applies to (e.g. "targets.browser.dest")
    pub field: String,
    /// Description of the problem
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

/// Validate the structural invariants of a pipeline spec: at least one
/// target, entries resolving to exactly one module, unique non-empty
/// destinations, and a global name on single-file-global outputs. Returns
/// all issues found; an empty vector means the descriptor is well-formed.
///
/// Executor availability is a separate, build-time concern; see
/// [`check_executors`].
pub fn validate_spec(spec: &PipelineSpec, ctx: &BuildContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if spec.is_empty() {
        issues.push(ValidationIssue {
            field: "targets".to_string(),
            message: "pipeline has no targets".to_string(),
        });
        return issues;
    }

    check_destinations(spec, &mut issues);
    for target in spec.targets() {
        check_entry(target, ctx, &mut issues);
        check_output(target, &mut issues);
    }

    issues
}

/// Check that every stage kind the spec declares has a registered
/// executor. Run before building; a well-formed descriptor can still name
/// stages the embedder never supplied.
pub fn check_executors(spec: &PipelineSpec, registry: &ExecutorRegistry) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for target in spec.targets() {
        check_stage_kinds(target, registry, &mut issues);
    }
    issues
}

/// Destination paths must be non-empty and unique across targets.
fn check_destinations(spec: &PipelineSpec, issues: &mut Vec<ValidationIssue>) {
    let mut seen: HashMap<&std::path::Path, &str> = HashMap::new();

    for target in spec.targets() {
        let field = format!("targets.{}.dest", target.name);
        if target.output.file.as_os_str().is_empty() {
            issues.push(ValidationIssue {
                field,
                message: "has no destination path (set 'dest' or a manifest output field)"
                    .to_string(),
            });
            continue;
        }

        match seen.get(target.output.file.as_path()) {
            Some(other) => issues.push(ValidationIssue {
                field,
                message: format!(
                    "destination '{}' already used by target '{}'",
                    target.output.file.display(),
                    other
                ),
            }),
            None => {
                seen.insert(target.output.file.as_path(), &target.name);
            }
        }
    }
}

/// The entry must resolve to exactly one source module.
fn check_entry(target: &TargetDescriptor, ctx: &BuildContext, issues: &mut Vec<ValidationIssue>) {
    let extensions = target
        .stages
        .iter()
        .find(|s| s.kind == StageKind::Resolve)
        .and_then(|s| s.str_list_option("extensions"))
        .unwrap_or_else(|| ctx.default_extensions().to_vec());

    if let Err(e) = resolve_entry(ctx.project_root(), &target.entry, &extensions) {
        issues.push(ValidationIssue {
            field: format!("targets.{}.entry", target.name),
            message: e.to_string(),
        });
    }
}

/// Single-file global bundles need a global name to bind.
fn check_output(target: &TargetDescriptor, issues: &mut Vec<ValidationIssue>) {
    if target.output.format.is_single_file_global() && target.output.global.is_none() {
        issues.push(ValidationIssue {
            field: format!("targets.{}.global", target.name),
            message: format!(
                "format '{}' requires a global name (set 'global', a manifest name, or a project name)",
                target.output.format
            ),
        });
    }
}

/// Every declared stage kind must have an executor.
fn check_stage_kinds(
    target: &TargetDescriptor,
    registry: &ExecutorRegistry,
    issues: &mut Vec<ValidationIssue>,
) {
    let stages = target.stages.iter().map(|s| ("stages", s));
    let post = target.output.post.iter().map(|s| ("post", s));

    for (section, stage) in stages.chain(post) {
        let kind = stage.kind.to_string();
        if !registry.contains(&kind) {
            issues.push(ValidationIssue {
                field: format!("targets.{}.{}", target.name, section),
                message: format!("no executor registered for stage kind '{}'", kind),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{Artifact, StageExecutor};
    use crate::config::default_config;
    use crate::descriptor::{OutputFormat, OutputSpec, StageSpec};
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct NoopStage(&'static str);

    impl StageExecutor for NoopStage {
        fn kind(&self) -> &str {
            self.0
        }
        fn apply(
            &self,
            artifact: Artifact,
            _stage: &StageSpec,
            _ctx: &BuildContext,
        ) -> Result<Artifact, String> {
            Ok(artifact)
        }
    }

    fn create_test_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn full_registry() -> ExecutorRegistry {
        let mut registry = ExecutorRegistry::with_builtins();
        registry.register(Box::new(NoopStage("compile")));
        registry.register(Box::new(NoopStage("minify")));
        registry
    }

    fn test_context(temp: &TempDir) -> BuildContext {
        BuildContext::new(default_config(), temp.path().to_path_buf())
    }

    fn test_target(name: &str, dest: &str) -> TargetDescriptor {
        TargetDescriptor {
            name: name.to_string(),
            entry: PathBuf::from("src/index.ts"),
            output: OutputSpec::new(PathBuf::from(dest))
                .with_global("app")
                .with_format(OutputFormat::Iife),
            stages: vec![StageSpec::resolve()],
        }
    }

    fn spec_of(targets: Vec<TargetDescriptor>) -> PipelineSpec {
        let mut spec = PipelineSpec::new();
        for target in targets {
            spec.add_target(target);
        }
        spec
    }

    #[test]
    fn test_validate_empty_pipeline() {
        let temp = TempDir::new().unwrap();
        let issues = validate_spec(&PipelineSpec::new(), &test_context(&temp));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "targets");
    }

    #[test]
    fn test_validate_ok() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/index.ts", "export {};");

        let spec = spec_of(vec![test_target("browser", "dist/app.js")]);
        let issues = validate_spec(&spec, &test_context(&temp));
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_validate_missing_entry() {
        let temp = TempDir::new().unwrap();

        let spec = spec_of(vec![test_target("browser", "dist/app.js")]);
        let issues = validate_spec(&spec, &test_context(&temp));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "targets.browser.entry");
        assert!(issues[0].message.contains("not found"));
    }

    #[test]
    fn test_validate_ambiguous_entry() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/index.js", "");
        create_test_file(temp.path(), "src/index.ts", "");

        let mut target = test_target("browser", "dist/app.js");
        target.entry = PathBuf::from("src/index");
        let issues = validate_spec(&spec_of(vec![target]), &test_context(&temp));

        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("ambiguous"));
    }

    #[test]
    fn test_validate_entry_uses_resolve_stage_extensions() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/index.tsx", "");

        let mut target = test_target("browser", "dist/app.js");
        target.entry = PathBuf::from("src/index");
        target.stages =
            vec![StageSpec::resolve().with_option("extensions", serde_json::json!([".tsx"]))];

        let issues = validate_spec(&spec_of(vec![target]), &test_context(&temp));
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_validate_empty_destination() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/index.ts", "");

        let mut target = test_target("browser", "");
        target.output.file = PathBuf::new();
        let issues = validate_spec(&spec_of(vec![target]), &test_context(&temp));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "targets.browser.dest");
        assert!(issues[0].message.contains("no destination"));
    }

    #[test]
    fn test_validate_duplicate_destination() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/index.ts", "");

        let spec = spec_of(vec![
            test_target("browser", "dist/app.js"),
            test_target("node", "dist/app.js"),
        ]);
        let issues = validate_spec(&spec, &test_context(&temp));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "targets.node.dest");
        assert!(issues[0].message.contains("already used by target 'browser'"));
    }

    #[test]
    fn test_validate_iife_requires_global() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/index.ts", "");

        let mut target = test_target("browser", "dist/app.js");
        target.output.global = None;
        let issues = validate_spec(&spec_of(vec![target]), &test_context(&temp));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "targets.browser.global");
    }

    #[test]
    fn test_validate_esm_does_not_require_global() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "src/index.ts", "");

        let mut target = test_target("lib", "dist/lib.mjs");
        target.output.global = None;
        target.output.format = OutputFormat::Esm;
        let issues = validate_spec(&spec_of(vec![target]), &test_context(&temp));
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_check_executors_ok() {
        let mut target = test_target("browser", "dist/app.js");
        target.stages.push(StageSpec::compile());
        target.output.post = vec![StageSpec::minify()];

        let issues = check_executors(&spec_of(vec![target]), &full_registry());
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_check_executors_unknown_stage_kind() {
        let mut target = test_target("browser", "dist/app.js");
        target.stages.push(StageSpec::other("treeshake"));

        let issues = check_executors(&spec_of(vec![target]), &full_registry());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "targets.browser.stages");
        assert!(issues[0].message.contains("treeshake"));
    }

    #[test]
    fn test_check_executors_post_stages_checked() {
        let mut target = test_target("browser", "dist/app.js");
        target.output.post = vec![StageSpec::minify()];

        let issues = check_executors(&spec_of(vec![target]), &ExecutorRegistry::with_builtins());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "targets.browser.post");
        assert!(issues[0].message.contains("minify"));
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue {
            field: "targets.browser.dest".to_string(),
            message: "has no destination path".to_string(),
        };
        assert_eq!(issue.to_string(), "'targets.browser.dest' has no destination path");
    }
}
