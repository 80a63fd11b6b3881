//! End-to-end resolution through `ConfigSet` against real project
//! directories.

use std::collections::HashSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Map, Value, json};
use tsj_core::{
    CompilerRegistry, ConfigSet, Diagnostic, Error, FileKeyOptions, HookEvent, HookFileProvider, NoHooks,
    RunnerSettings, StandardCompiler, StandardEngine,
};
use tsj_fs::DIGEST_LEN;
use tsj_test_utils::TestProject;

fn config_from(settings: Value) -> ConfigSet {
    ConfigSet::new(RunnerSettings::from_value(settings).unwrap()).with_hook_provider(Arc::new(NoHooks))
}

fn config(project: &TestProject, embedded: Value) -> ConfigSet {
    config_from(project.settings(embedded))
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn standard_project() -> TestProject {
    let project = TestProject::with_source();
    project.write(
        "tsconfig.json",
        r#"{
            // project settings
            "compilerOptions": { "target": "es2017", "strict": true, },
        }"#,
    );
    project
}

#[test]
fn cache_key_is_deterministic() {
    let project = standard_project();

    let first = config(&project, json!({})).cache_key().unwrap().to_string();
    let second = config(&project, json!({})).cache_key().unwrap().to_string();

    assert_eq!(first, second);
    assert_eq!(first.len(), DIGEST_LEN);
}

#[test]
fn cache_key_is_sensitive_to_every_input() {
    let project = standard_project();
    let file = project.path("src/index.ts");
    let other_file = project.path("src/other.ts");
    let plain = FileKeyOptions::default();
    let mut keys = Vec::new();

    let base = config(&project, json!({}));
    keys.push(base.file_cache_key("const a = 1;", &file, &plain).unwrap());
    keys.push(base.file_cache_key("const a = 2;", &file, &plain).unwrap());
    keys.push(base.file_cache_key("const a = 1;", &other_file, &plain).unwrap());
    let instrumented = FileKeyOptions { instrument: true, ..FileKeyOptions::default() };
    keys.push(base.file_cache_key("const a = 1;", &file, &instrumented).unwrap());
    let elsewhere = FileKeyOptions { root_dir: Some("/elsewhere".to_string()), ..FileKeyOptions::default() };
    keys.push(base.file_cache_key("const a = 1;", &file, &elsewhere).unwrap());

    let overridden = config(&project, json!({})).with_parent_options(object(json!({ "typeCheck": true })));
    keys.push(overridden.file_cache_key("const a = 1;", &file, &plain).unwrap());

    let plain_diagnostics = config(&project, json!({ "diagnostics": { "pretty": false } }));
    keys.push(plain_diagnostics.file_cache_key("const a = 1;", &file, &plain).unwrap());

    let mut settings = project.settings(json!({}));
    settings["testRegex"] = json!("\\.spec\\.ts$");
    keys.push(config_from(settings).file_cache_key("const a = 1;", &file, &plain).unwrap());

    project.write("tsconfig.json", r#"{ "compilerOptions": { "target": "es2019" } }"#);
    let edited = config(&project, json!({}));
    keys.push(edited.file_cache_key("const a = 1;", &file, &plain).unwrap());

    let unique: HashSet<&String> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len(), "{keys:#?}");
    assert!(keys.iter().all(|key| key.len() == DIGEST_LEN));
}

#[test]
fn cache_directory_ignores_redundant_default_codes() {
    let project = standard_project();
    let plain = config_from(project.cached_settings(json!({})));
    let redundant = config_from(project.cached_settings(json!({ "diagnostics": { "ignoreCodes": [6059] } })));

    assert_eq!(
        plain.cache_directory_name().unwrap(),
        redundant.cache_directory_name().unwrap()
    );

    let name = plain.cache_directory_name().unwrap().unwrap().to_string();
    assert!(name.starts_with("tsj-"));
    assert_eq!(
        plain.cache_dir().unwrap().unwrap(),
        std::path::PathBuf::from(project.path(".cache")).join(&name)
    );
}

#[test]
fn cache_directory_tracks_compiler_choice() {
    let project = standard_project();
    let mut compilers = CompilerRegistry::with_builtins();
    compilers.register("ttypescript", Arc::new(StandardCompiler::with_version("0.0.1-test")));

    let standard = config_from(project.cached_settings(json!({})));
    let custom = config_from(project.cached_settings(json!({ "compiler": "ttypescript" }))).with_compilers(compilers);

    assert_eq!(custom.compiler().unwrap().version(), "0.0.1-test");
    assert_ne!(
        standard.cache_directory_name().unwrap(),
        custom.cache_directory_name().unwrap()
    );
}

#[test]
fn no_cache_directory_without_caching() {
    let project = standard_project();
    let config = config(&project, json!({}));
    assert_eq!(config.cache_directory_name().unwrap(), None);
    assert_eq!(config.cache_dir().unwrap(), None);
}

#[test]
fn parent_options_win_for_reference_options() {
    let project = standard_project();
    project.write("other.json", r#"{ "compilerOptions": {} }"#);

    let config = config(&project, json!({ "tsConfig": "other.json", "babelConfig": { "plugins": ["a"] } }))
        .with_parent_options(object(json!({ "tsConfig": false, "babelConfig": false })));

    let options = config.options().unwrap();
    assert_eq!(options.ts_config, None);
    assert_eq!(options.babel_config, None);
    assert_eq!(config.tsconfig().unwrap(), Some(&json!({ "compilerOptions": {} })));
    assert_eq!(config.secondary_config().unwrap(), None);
    assert_eq!(
        config.runner().unwrap().embedded_options().unwrap()["tsConfig"],
        false
    );
}

#[test]
fn parent_diagnostics_replace_embedded_wholesale() {
    let project = standard_project();
    let config = config(&project, json!({ "diagnostics": { "pretty": false, "ignoreCodes": [2307] } }))
        .with_parent_options(object(json!({ "diagnostics": { "pathRegex": "\\.test\\.ts$" } })));

    let diagnostics = &config.options().unwrap().diagnostics;
    assert!(diagnostics.pretty);
    assert_eq!(diagnostics.ignore_codes, vec![6059, 18002, 18003]);
    assert_eq!(diagnostics.path_regex.as_deref(), Some(r"\.test\.ts$"));
}

#[test]
fn forced_directives_win_over_project_file() {
    let project = TestProject::with_source();
    project.write(
        "tsconfig.json",
        r#"{ "compilerOptions": { "declaration": true, "outFile": "out.js", "module": "esnext" } }"#,
    );
    let config = config(&project, json!({}));

    let directives = config.directives().unwrap();
    assert_eq!(directives["declaration"], false);
    assert_eq!(directives["module"], "commonjs");
    assert_eq!(directives["target"], "es5");
    assert!(!directives.contains_key("outFile"));
    assert_eq!(
        config.project_description().unwrap().resolved.forced_overrides,
        vec!["declaration", "module", "outFile"]
    );
}

#[test]
fn explicit_rootdir_relative_description_file() {
    let project = TestProject::with_source();
    project.write("config/tsconfig.test.json", r#"{ "compilerOptions": { "jsx": "React" } }"#);
    let config = config(&project, json!({ "tsConfig": "<rootDir>/config/tsconfig.test.json" }));

    assert_eq!(config.directives().unwrap()["jsx"], "react");
}

#[test]
fn inline_description_becomes_input() {
    let project = TestProject::with_source();
    let config = config(&project, json!({ "tsConfig": { "strict": true } }));

    assert_eq!(
        config.tsconfig().unwrap(),
        Some(&json!({ "compilerOptions": { "strict": true } }))
    );
    assert_eq!(config.directives().unwrap()["strict"], true);
}

#[test]
fn inline_description_layers_over_project_file() {
    let project = standard_project();
    let config = config(&project, json!({ "tsConfig": { "jsx": "react" } }));

    let directives = config.directives().unwrap();
    assert_eq!(directives["target"], "es2017");
    assert_eq!(directives["strict"], true);
    assert_eq!(directives["jsx"], "react");
}

#[test]
fn missing_explicit_file_fails_before_resolution() {
    let project = TestProject::with_source();
    let config = config(&project, json!({ "tsConfig": "nope/tsconfig.json" }));

    let err = config.project_description().unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, Error::Fs(tsj_fs::Error::FileNotFound { .. })), "{message}");
    assert!(message.contains("nope/tsconfig.json"));
    assert!(message.contains(&project.path("nope/tsconfig.json")));
}

#[test]
fn malformed_description_raises_diagnostics() {
    let project = TestProject::with_source();
    project.write("tsconfig.json", "{ \"compilerOptions\": ");
    let config = config(&project, json!({ "diagnostics": { "pretty": false } }));

    let err = config.project_description().unwrap_err();
    let Error::Diagnostics(diagnostics) = &err else {
        panic!("expected diagnostics error, got {err:?}");
    };
    assert_eq!(diagnostics.diagnostic_codes, vec![1005]);
    assert!(err.to_string().starts_with("⨯ Unable to compile TypeScript:\n"));
    assert!(diagnostics.diagnostic_text.contains("error TS1005"));
    // memoized failure replays for dependent views
    assert!(matches!(config.cache_key(), Err(Error::Diagnostics(_))));
}

#[rstest]
#[case(json!({}), false)]
#[case(json!({ "diagnostics": { "ignoreCodes": "5023" } }), true)]
#[case(json!({ "diagnostics": { "pathRegex": "\\.test\\.ts$" } }), true)]
fn unknown_directive_reporting(#[case] embedded: Value, #[case] resolves: bool) {
    let project = TestProject::with_source();
    project.write("tsconfig.json", r#"{ "compilerOptions": { "notARealOption": 1 } }"#);

    let result = config(&project, embedded).project_description().map(|_| ());
    assert_eq!(result.is_ok(), resolves, "{result:?}");
}

#[test]
fn diagnostics_filtering_through_config_set() {
    let project = standard_project();
    let config = config(&project, json!({ "diagnostics": { "ignoreCodes": [2307] } }));
    let diagnostics = vec![
        Diagnostic::error(6059, "rootDir"),
        Diagnostic::error(2307, "Cannot find module 'x'."),
        Diagnostic::error(1005, "';' expected."),
    ];

    let codes: Vec<u32> = config
        .filter_diagnostics(&diagnostics, None)
        .unwrap()
        .iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(codes, vec![1005]);
}

#[test]
fn path_scoped_diagnostics() {
    let project = standard_project();
    let config = config(&project, json!({ "diagnostics": { "pathRegex": "\\.test\\.ts$" } }));

    assert!(config.should_report_diagnostic("a.test.ts").unwrap());
    assert!(!config.should_report_diagnostic("a.ts").unwrap());
}

#[test]
fn disabled_diagnostics_report_nothing() {
    let project = standard_project();
    let config = config(&project, json!({ "diagnostics": false }));
    let diagnostics = vec![Diagnostic::error(1005, "x"), Diagnostic::error(2322, "y")];

    let absolute = project.path("src/index.ts");
    for path in ["src/index.ts", absolute.as_str(), "a.test.ts"] {
        assert!(!config.should_report_diagnostic(path).unwrap());
        assert!(config.filter_diagnostics(&diagnostics, Some(path)).unwrap().is_empty());
    }
}

#[test]
fn create_diagnostics_error_uses_policy_formatting() {
    let project = standard_project();
    let config = config(&project, json!({ "diagnostics": { "pretty": false } }));
    let diagnostics = vec![Diagnostic::error(2304, "Cannot find name 'x'.").with_file(project.path("src/index.ts"))];

    let err = config.create_diagnostics_error(&diagnostics).unwrap();
    assert_eq!(err.diagnostic_text, "src/index.ts: error TS2304: Cannot find name 'x'.\n");
    assert_eq!(err.diagnostic_codes, vec![2304]);
}

#[test]
fn stringify_content_follows_regex() {
    let project = standard_project();
    let config = config(&project, json!({ "stringifyContentPathRegex": { "source": "\\.html$" } }));
    assert!(config.should_stringify_content("templates/a.html").unwrap());
    assert!(!config.should_stringify_content("src/a.ts").unwrap());

    let unset = self::config(&project, json!({}));
    assert!(!unset.should_stringify_content("templates/a.html").unwrap());
}

#[test]
fn secondary_config_merges_over_cwd() {
    let project = standard_project();
    project.write(".babelrc", r#"{ "presets": ["env"] }"#);
    let config = config(&project, json!({ "babelConfig": ".babelrc" }));

    assert_eq!(
        config.secondary_config().unwrap(),
        Some(&json!({ "cwd": project.root_str(), "presets": ["env"] }))
    );
}

#[test]
fn secondary_auto_detect_uses_project_file() {
    let project = standard_project();
    project.write("babel.config.json", r#"{ "plugins": ["istanbul"] }"#);
    let config = config(&project, json!({ "babelConfig": true }));

    let secondary = config.secondary_config().unwrap().unwrap();
    assert_eq!(secondary["plugins"], json!(["istanbul"]));
}

#[test]
fn legacy_engine_drops_cwd() {
    let project = standard_project();
    let config = config(&project, json!({ "babelConfig": { "presets": ["es2015"] } }))
        .with_engine(Arc::new(StandardEngine::legacy("6.26.0")));

    assert_eq!(config.engine_adapter(), tsj_core::EngineAdapter::Legacy);
    assert_eq!(config.secondary_config().unwrap(), Some(&json!({ "presets": ["es2015"] })));
}

#[test]
fn secondary_config_changes_cache_key() {
    let project = standard_project();
    let without = config(&project, json!({})).cache_key().unwrap().to_string();
    let with = config(&project, json!({ "babelConfig": { "plugins": ["a"] } }))
        .cache_key()
        .unwrap()
        .to_string();
    assert_ne!(without, with);
}

#[test]
fn cache_key_follows_extended_description() {
    let project = TestProject::with_source();
    project
        .write("tsconfig.json", r#"{ "extends": "./base.json", "compilerOptions": { "strict": true } }"#)
        .write("base.json", r#"{ "compilerOptions": { "target": "es2015" } }"#);
    let before = config(&project, json!({}));
    assert_eq!(before.directives().unwrap()["target"], "es2015");
    let before_key = before.cache_key().unwrap().to_string();

    project.write("base.json", r#"{ "compilerOptions": { "target": "es2019" } }"#);
    let after = config(&project, json!({}));

    assert_eq!(after.directives().unwrap()["target"], "es2019");
    assert_eq!(after.tsconfig().unwrap(), before.tsconfig().unwrap());
    assert_ne!(after.cache_key().unwrap(), before_key);
}

#[test]
fn hooks_come_from_provider() {
    let project = standard_project();
    project.write(
        "hooks.toml",
        r#"
[[hooks]]
event = "before-process"
command = "true"
"#,
    );
    let config = config(&project, json!({})).with_hook_provider(Arc::new(HookFileProvider::new("hooks.toml")));

    let hooks = config.hooks().unwrap();
    assert_eq!(hooks.for_event(HookEvent::BeforeProcess).count(), 1);
    assert_eq!(hooks.for_event(HookEvent::AfterProcess).count(), 0);
}

#[test]
fn settings_from_json_string() {
    let project = standard_project();
    let json = project.settings(json!({ "typeCheck": "yes" })).to_string();

    let config = ConfigSet::from_json_str(&json).unwrap().with_hook_provider(Arc::new(NoHooks));
    assert!(config.options().unwrap().type_check);
    assert_eq!(config.cwd().as_str(), project.root_str());
}
