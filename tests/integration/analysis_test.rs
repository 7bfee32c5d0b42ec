//! End-to-end pipeline tests: discovery, parsing, analysis, configuration

use sdkguard::analysis::{ApiFinding, GuardAnalyzer};
use sdkguard::apidb::ApiDatabase;
use sdkguard::config::Config;
use sdkguard::discovery::FileFinder;
use sdkguard::parser::parser_for_path;
use sdkguard::resolve::AndroidResolver;
use sdkguard::ApiLevel;
use std::path::Path;
use tempfile::TempDir;

fn write_file(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Run the whole pipeline over a project directory.
fn analyze_project(root: &Path, config: &Config, db: &ApiDatabase) -> Vec<ApiFinding> {
    let finder = FileFinder::new(config);
    let files = finder.find_files(root).expect("discovery failed");

    let resolver = AndroidResolver::new();
    let analyzer = GuardAnalyzer::new(&resolver, ApiLevel::new(config.min_sdk))
        .respect_suppressions(config.respect_suppressions);

    let mut findings = Vec::new();
    for file in &files {
        let parser = parser_for_path(&file.path).expect("no parser for discovered file");
        let unit = parser.parse_file(&file.path).expect("parse failed");
        findings.extend(analyzer.analyze_unit(&unit, db));
    }
    findings
}

#[test]
fn test_mixed_project_pipeline() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "app/src/Main.java",
        r#"
        class Main {
            void unguarded(Context ctx) {
                ctx.getDrawable(0);
            }
            void guarded(Context ctx) {
                if (Build.VERSION.SDK_INT >= 21) {
                    ctx.getDrawable(0);
                }
            }
        }
        "#,
    );
    write_file(
        dir.path(),
        "app/src/Util.kt",
        r#"
        fun unguarded(ctx: Context) {
            ctx.createNotificationChannel(channel)
        }

        fun guarded(ctx: Context) {
            if (Build.VERSION.SDK_INT < 26) return
            ctx.createNotificationChannel(channel)
        }
        "#,
    );

    let config = Config {
        min_sdk: 19,
        ..Config::default()
    };
    let findings = analyze_project(dir.path(), &config, &ApiDatabase::builtin());

    assert_eq!(findings.len(), 2);
    assert!(findings.iter().any(|f| f.name == "getDrawable"));
    assert!(findings.iter().any(|f| f.name == "createNotificationChannel"));
}

#[test]
fn test_min_sdk_filters_findings() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "Main.java",
        r#"
        class Main {
            void f(Context ctx) {
                ctx.getDrawable(0);
                ctx.getDisplay();
            }
        }
        "#,
    );

    let config = Config {
        min_sdk: 21,
        ..Config::default()
    };
    let findings = analyze_project(dir.path(), &config, &ApiDatabase::builtin());

    // getDrawable (21) is covered by min_sdk, getDisplay (30) is not
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].name, "getDisplay");
}

#[test]
fn test_excluded_directory_skipped() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "build/Generated.java",
        r#"
        class Generated {
            void f(Context ctx) {
                ctx.getDrawable(0);
            }
        }
        "#,
    );

    let config = Config {
        min_sdk: 19,
        ..Config::default()
    };
    let findings = analyze_project(dir.path(), &config, &ApiDatabase::builtin());
    assert!(findings.is_empty());
}

#[test]
fn test_api_table_overlay() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "Main.kt",
        r#"
        fun f(sdk: VendorSdk) {
            sdk.vendorFeature()
        }
        "#,
    );
    write_file(dir.path(), "api-levels.toml", "[api]\nvendorFeature = 28\n");

    let mut db = ApiDatabase::builtin();
    db.load_overlay(&dir.path().join("api-levels.toml")).unwrap();

    let config = Config {
        min_sdk: 24,
        ..Config::default()
    };
    let findings = analyze_project(dir.path(), &config, &db);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].name, "vendorFeature");
    assert_eq!(findings[0].requirement, ApiLevel::new(28));
}

#[test]
fn test_suppression_toggle() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "Main.java",
        r#"
        class Main {
            void f(Context ctx) {
                // noinspection NewApi
                ctx.getDrawable(0);
            }
        }
        "#,
    );

    let respectful = Config {
        min_sdk: 19,
        ..Config::default()
    };
    assert!(analyze_project(dir.path(), &respectful, &ApiDatabase::builtin()).is_empty());

    let strict = Config {
        min_sdk: 19,
        respect_suppressions: false,
        ..Config::default()
    };
    assert_eq!(
        analyze_project(dir.path(), &strict, &ApiDatabase::builtin()).len(),
        1
    );
}

#[test]
fn test_finding_locations_point_at_calls() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "Main.java",
        "class Main {\n    void f(Context ctx) {\n        ctx.getDrawable(0);\n    }\n}\n",
    );

    let config = Config {
        min_sdk: 19,
        ..Config::default()
    };
    let findings = analyze_project(dir.path(), &config, &ApiDatabase::builtin());

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].location.line, 3);
    assert!(findings[0].location.file.ends_with("Main.java"));
}
