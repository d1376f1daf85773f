//! End-to-end pipeline tests against a scaffolded project directory.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

use taglet::config::Config;
use taglet::core::{
    ArgPosition, EXPORT_FILE_NAME, FileStemResolver, JsonCollector, LiteralResolver,
    NamespaceResolver, Pipeline, PipelineOptions, RunReport,
};
use taglet::discovery::discover_files;
use taglet::logger::{Level, MemoryLogger};

struct Project {
    dir: TempDir,
    logger: MemoryLogger,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempdir().unwrap(),
            logger: MemoryLogger::new(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    fn read_json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            tag_name: "tr".to_string(),
            arg_position: ArgPosition::First,
            library: false,
            output_dir: self.root().join("translations"),
            language: "en".to_string(),
            package_name: "fixture".to_string(),
            clean: false,
            regenerate: true,
            from_library: false,
        }
    }

    fn run_with(&self, options: PipelineOptions, resolver: &dyn NamespaceResolver) -> RunReport {
        let config = Config::default();
        let files = discover_files(self.root(), &config).unwrap();
        let collector = JsonCollector::new(self.root().join("translations"));
        let pipeline = Pipeline::new(options, resolver, &collector, &self.logger).unwrap();
        pipeline.run(&files).unwrap()
    }

    fn run(&self) -> RunReport {
        self.run_with(self.options(), &LiteralResolver)
    }
}

#[test]
fn collects_tags_into_namespace_files() {
    let project = Project::new();
    project.write(
        "src/pages/home.tsx",
        r#"const title = tr({title: "Welcome"}, {namespace: "home"});
const cta = tr({startNow: "Start now"}, {namespace: "home", path: "cta"});
"#,
    );
    project.write(
        "src/components/button.tsx",
        r#"tr({save: "Save", cancel: "Cancel"}, {namespace: "common"});"#,
    );

    let report = project.run();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.tags_found, 3);
    assert_eq!(report.tags_dropped, 0);
    assert_eq!(report.namespaces_written, vec!["common", "home"]);

    assert_eq!(
        project.read_json("translations/home.json"),
        json!({"title": "Welcome", "cta": {"startNow": "Start now"}})
    );
    assert_eq!(
        project.read_json("translations/common.json"),
        json!({"save": "Save", "cancel": "Cancel"})
    );
}

#[test]
fn second_run_is_a_no_op() {
    let project = Project::new();
    project.write(
        "src/app.ts",
        r#"tr({greeting: "Hello"}, {namespace: "common"});"#,
    );

    let first = project.run();
    assert_eq!(first.namespaces_written, vec!["common"]);

    let collection_before = project.read("translations/common.json");
    let source_before = project.read("src/app.ts");

    let second = project.run();
    assert!(second.namespaces_written.is_empty());
    assert_eq!(second.files_regenerated, 0);
    assert_eq!(project.read("translations/common.json"), collection_before);
    assert_eq!(project.read("src/app.ts"), source_before);
}

#[test]
fn merges_with_existing_collection_content() {
    let project = Project::new();
    project.write("translations/common.json", "{\n  \"a\": \"1\"\n}\n");
    project.write("src/app.ts", r#"tr({b: "2"}, {namespace: "common"});"#);

    let report = project.run();

    assert_eq!(report.namespaces_written, vec!["common"]);
    assert_eq!(
        project.read_json("translations/common.json"),
        json!({"a": "1", "b": "2"})
    );
}

#[test]
fn clean_rebuild_drops_stale_collections() {
    let project = Project::new();
    project.write("translations/stale.json", r#"{"old": "gone"}"#);
    project.write("src/app.ts", r#"tr({a: "1"}, {namespace: "common"});"#);

    let mut options = project.options();
    options.clean = true;
    let report = project.run_with(options, &LiteralResolver);

    assert_eq!(report.namespaces_written, vec!["common"]);
    assert!(!project.root().join("translations/stale.json").exists());
}

#[test]
fn unresolvable_tags_dropped_with_warning() {
    let project = Project::new();
    project.write(
        "src/app.ts",
        "tr({placed: \"yes\"}, {namespace: \"common\"});\ntr({lost: \"no namespace\"});\n",
    );

    let report = project.run();

    assert_eq!(report.tags_found, 2);
    assert_eq!(report.tags_dropped, 1);
    let warnings = project.logger.messages_at(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("no resolvable namespace"));
    assert!(!project.read("translations/common.json").contains("lost"));
}

#[test]
fn file_stem_resolver_places_undeclared_tags() {
    let project = Project::new();
    project.write("src/checkout.tsx", r#"tr({pay: "Pay now"});"#);

    let report = project.run_with(project.options(), &FileStemResolver);

    assert_eq!(report.namespaces_written, vec!["checkout"]);
    assert_eq!(
        project.read_json("translations/checkout.json"),
        json!({"pay": "Pay now"})
    );
    // Regeneration writes the derived namespace back into the source.
    assert_eq!(
        project.read("src/checkout.tsx"),
        r#"tr({pay: "Pay now"}, {namespace: "checkout"});"#
    );
}

#[test]
fn regeneration_preserves_surrounding_bytes() {
    let project = Project::new();
    let source = "// top comment\t \nconst x = tr({a: \"1\"}, { namespace: 'common' });\n// bottom\n";
    project.write("src/app.ts", source);

    let report = project.run();

    assert_eq!(report.files_regenerated, 1);
    assert_eq!(
        project.read("src/app.ts"),
        "// top comment\t \nconst x = tr({a: \"1\"}, {namespace: \"common\"});\n// bottom\n"
    );
}

#[test]
fn invalid_tags_do_not_abort_the_run() {
    let project = Project::new();
    project.write(
        "src/app.ts",
        "tr({ok: \"1\"}, {namespace: \"common\"});\ntr(\"not an object\");\ntr({fine: \"2\"}, broken!);\n",
    );

    let report = project.run();

    assert_eq!(report.tags_found, 3);
    assert_eq!(report.tags_dropped, 2);
    let warnings = project.logger.messages_at(Level::Warn);
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().any(|w| w.contains("invalid-param-1")));
    assert!(warnings.iter().any(|w| w.contains("invalid-param-2")));
    assert_eq!(
        project.read_json("translations/common.json"),
        json!({"ok": "1"})
    );
}

#[test]
fn library_mode_writes_export_snapshot_only() {
    let project = Project::new();
    project.write(
        "src/lib.ts",
        r#"const greeting = tr({hello: "Hello"}, {namespace: "lib"});"#,
    );

    let mut options = project.options();
    options.library = true;
    let report = project.run_with(options, &LiteralResolver);

    assert!(report.namespaces_written.is_empty());
    assert!(!project.root().join("translations/lib.json").exists());

    let snapshot = project.read_json(&format!("translations/{EXPORT_FILE_NAME}"));
    assert_eq!(snapshot["language"], "en");
    assert_eq!(snapshot["packageName"], "fixture");
    let matches = &snapshot["files"]["src/lib.ts"]["matches"];
    assert_eq!(matches[0]["translations"], "{hello: \"Hello\"}");
    assert_eq!(matches[0]["config"], "{namespace: \"lib\"}");
    assert_eq!(matches[0]["variableName"], "greeting");
}

#[test]
fn library_clean_drops_stale_collections() {
    let project = Project::new();
    project.write("translations/stale.json", r#"{"old": "gone"}"#);
    project.write(
        "src/lib.ts",
        r#"tr({hello: "Hello"}, {namespace: "lib"});"#,
    );

    let mut options = project.options();
    options.library = true;
    options.clean = true;
    project.run_with(options, &LiteralResolver);

    assert!(!project.root().join("translations/stale.json").exists());
    let snapshot = project.read_json(&format!("translations/{EXPORT_FILE_NAME}"));
    assert_eq!(snapshot["files"]["src/lib.ts"]["matches"][0]["config"], "{namespace: \"lib\"}");
}

#[test]
fn shape_conflict_aborts_without_writing() {
    let project = Project::new();
    project.write(
        "src/app.ts",
        "tr({auth: \"a leaf\"}, {namespace: \"common\"});\ntr({title: \"t\"}, {namespace: \"common\", path: \"auth\"});\n",
    );

    let config = Config::default();
    let files = discover_files(project.root(), &config).unwrap();
    let collector = JsonCollector::new(project.root().join("translations"));
    let pipeline = Pipeline::new(
        project.options(),
        &LiteralResolver,
        &collector,
        &project.logger,
    )
    .unwrap();

    let err = pipeline.run(&files).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("src/app.ts"));
    assert!(!project.root().join("translations").exists());
}

#[test]
fn later_tag_wins_on_collision() {
    let project = Project::new();
    project.write(
        "src/a.ts",
        r#"tr({label: "first"}, {namespace: "common", path: "x"});"#,
    );
    project.write(
        "src/b.ts",
        r#"tr({label: "second"}, {namespace: "common", path: "x"});"#,
    );

    project.run();

    assert_eq!(
        project.read_json("translations/common.json"),
        json!({"x": {"label": "second"}})
    );
}
