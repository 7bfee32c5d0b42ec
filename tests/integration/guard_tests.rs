//! Integration tests for the guard proofs over real parsed sources
//!
//! These go through the full parse-then-prove path in both languages and
//! pin down the per-operator polarities at the source level.

use sdkguard::analysis::GuardAnalyzer;
use sdkguard::parser::{JavaParser, KotlinParser, ParsedUnit, Parser};
use sdkguard::resolve::AndroidResolver;
use sdkguard::ApiLevel;
use std::path::Path;

fn parse_java(source: &str) -> ParsedUnit {
    JavaParser::new()
        .parse_source(Path::new("Test.java"), source)
        .expect("Failed to parse Java source")
}

fn parse_kotlin(source: &str) -> ParsedUnit {
    KotlinParser::new()
        .parse_source(Path::new("Test.kt"), source)
        .expect("Failed to parse Kotlin source")
}

/// Is the named call proven guarded at `required`?
fn guarded(unit: &ParsedUnit, name: &str, required: i64) -> bool {
    let resolver = AndroidResolver::new();
    let analyzer = GuardAnalyzer::new(&resolver, ApiLevel::MIN);
    let call = unit
        .calls
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no call named {name}"));
    analyzer.is_guarded(unit, call.node, ApiLevel::new(required))
}

// ============================================================================
// Comparison operator polarities (Java)
// ============================================================================

mod operator_polarities {
    use super::*;

    fn then_branch(op: &str, level: &str) -> ParsedUnit {
        parse_java(&format!(
            r#"
            class A {{
                void f(Context ctx) {{
                    if (Build.VERSION.SDK_INT {op} {level}) {{
                        ctx.getDrawable(0);
                    }}
                }}
            }}
            "#
        ))
    }

    fn else_branch(op: &str, level: &str) -> ParsedUnit {
        parse_java(&format!(
            r#"
            class A {{
                void f(Context ctx) {{
                    if (Build.VERSION.SDK_INT {op} {level}) {{
                        fallback(ctx);
                    }} else {{
                        ctx.getDrawable(0);
                    }}
                }}
            }}
            "#
        ))
    }

    #[test]
    fn test_ge_in_then() {
        assert!(guarded(&then_branch(">=", "21"), "getDrawable", 21));
        assert!(guarded(&then_branch(">=", "23"), "getDrawable", 21));
        assert!(!guarded(&then_branch(">=", "19"), "getDrawable", 21));
    }

    #[test]
    fn test_gt_in_then() {
        assert!(guarded(&then_branch(">", "20"), "getDrawable", 21));
        assert!(!guarded(&then_branch(">", "19"), "getDrawable", 21));
    }

    #[test]
    fn test_lt_in_else() {
        assert!(guarded(&else_branch("<", "21"), "getDrawable", 21));
        assert!(!guarded(&else_branch("<", "20"), "getDrawable", 21));
    }

    #[test]
    fn test_le_in_else() {
        assert!(guarded(&else_branch("<=", "20"), "getDrawable", 21));
        assert!(!guarded(&else_branch("<=", "19"), "getDrawable", 21));
    }

    #[test]
    fn test_eq_in_then() {
        assert!(guarded(&then_branch("==", "21"), "getDrawable", 21));
        assert!(!guarded(&then_branch("==", "19"), "getDrawable", 21));
    }

    #[test]
    fn test_wrong_branch_never_proven() {
        // call in the else of a positive check
        assert!(!guarded(&else_branch(">=", "25"), "getDrawable", 21));
        // call in the then of a negative check
        assert!(!guarded(&then_branch("<", "25"), "getDrawable", 21));
    }

    #[test]
    fn test_symbolic_build_code() {
        let unit = then_branch(">=", "Build.VERSION_CODES.LOLLIPOP");
        assert!(guarded(&unit, "getDrawable", 21));
        assert!(!guarded(&unit, "getDrawable", 22));
    }

    #[test]
    fn test_unknown_build_code_not_proven() {
        let unit = then_branch(">=", "Build.VERSION_CODES.SOME_FUTURE_RELEASE");
        assert!(!guarded(&unit, "getDrawable", 21));
    }
}

// ============================================================================
// Boolean composition
// ============================================================================

mod composition {
    use super::*;

    #[test]
    fn test_anded_check_guards_right_operand() {
        let unit = parse_java(
            r#"
            class A {
                void f(View v) {
                    boolean ok = Build.VERSION.SDK_INT >= 23 && v.isAttachedToWindow();
                }
            }
            "#,
        );
        assert!(guarded(&unit, "isAttachedToWindow", 23));
        assert!(!guarded(&unit, "isAttachedToWindow", 24));
    }

    #[test]
    fn test_check_after_call_does_not_count() {
        // the comparison evaluates after the call
        let unit = parse_java(
            r#"
            class A {
                void f(View v) {
                    boolean ok = v.isAttachedToWindow() && Build.VERSION.SDK_INT >= 23;
                }
            }
            "#,
        );
        assert!(!guarded(&unit, "isAttachedToWindow", 23));
    }

    #[test]
    fn test_anded_condition_guards_then_branch() {
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx, boolean enabled) {
                    if (enabled && Build.VERSION.SDK_INT >= 26) {
                        ctx.startForegroundService(null);
                    }
                }
            }
            "#,
        );
        assert!(guarded(&unit, "startForegroundService", 26));
        assert!(!guarded(&unit, "startForegroundService", 27));
    }

    #[test]
    fn test_ored_negative_checks_guard_else_branch() {
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx) {
                    if (Build.VERSION.SDK_INT < 19 || Build.VERSION.SDK_INT < 23) {
                        fallback(ctx);
                    } else {
                        ctx.checkSelfPermission("p");
                    }
                }
            }
            "#,
        );
        assert!(guarded(&unit, "checkSelfPermission", 23));
        assert!(!guarded(&unit, "checkSelfPermission", 24));
    }

    #[test]
    fn test_ored_check_in_chain() {
        // SDK_INT < 23 || call(): the call only runs at 23+
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx) {
                    boolean ok = Build.VERSION.SDK_INT < 23 || ctx.checkSelfPermission("p") == 0;
                }
            }
            "#,
        );
        assert!(guarded(&unit, "checkSelfPermission", 23));
        assert!(!guarded(&unit, "checkSelfPermission", 24));
    }
}

// ============================================================================
// Early exits
// ============================================================================

mod early_exits {
    use super::*;

    #[test]
    fn test_return_exit() {
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx) {
                    if (Build.VERSION.SDK_INT < 21) {
                        return;
                    }
                    ctx.getDrawable(0);
                }
            }
            "#,
        );
        assert!(guarded(&unit, "getDrawable", 21));
        assert!(!guarded(&unit, "getDrawable", 22));
    }

    #[test]
    fn test_throw_exit() {
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx) {
                    if (Build.VERSION.SDK_INT < 26) {
                        throw new IllegalStateException("unsupported");
                    }
                    ctx.createNotificationChannel(null);
                }
            }
            "#,
        );
        assert!(guarded(&unit, "createNotificationChannel", 26));
        assert!(!guarded(&unit, "createNotificationChannel", 27));
    }

    #[test]
    fn test_positive_exit_is_not_a_guard() {
        // continuation runs on OLD versions here
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx) {
                    if (Build.VERSION.SDK_INT >= 21) {
                        return;
                    }
                    ctx.getDrawable(0);
                }
            }
            "#,
        );
        assert!(!guarded(&unit, "getDrawable", 21));
    }

    #[test]
    fn test_exit_after_call_is_too_late() {
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx) {
                    ctx.getDrawable(0);
                    if (Build.VERSION.SDK_INT < 21) {
                        return;
                    }
                }
            }
            "#,
        );
        assert!(!guarded(&unit, "getDrawable", 21));
    }

    #[test]
    fn test_exit_guard_in_outer_scope() {
        let unit = parse_java(
            r#"
            class A {
                void f(Context ctx, boolean flag) {
                    if (Build.VERSION.SDK_INT < 21) {
                        return;
                    }
                    if (flag) {
                        ctx.getDrawable(0);
                    }
                }
            }
            "#,
        );
        assert!(guarded(&unit, "getDrawable", 21));
    }
}

// ============================================================================
// Helper methods
// ============================================================================

mod helper_methods {
    use super::*;

    #[test]
    fn test_trivial_helper_is_inlined() {
        let unit = parse_java(
            r#"
            class A {
                boolean isAtLeastO() {
                    return Build.VERSION.SDK_INT >= 26;
                }
                void f(Context ctx) {
                    if (isAtLeastO()) {
                        ctx.startForegroundService(null);
                    }
                }
            }
            "#,
        );
        assert!(guarded(&unit, "startForegroundService", 26));
        assert!(!guarded(&unit, "startForegroundService", 27));
    }

    #[test]
    fn test_complex_helper_is_not_inlined() {
        let unit = parse_java(
            r#"
            class A {
                boolean isAtLeastO() {
                    log("checking");
                    return Build.VERSION.SDK_INT >= 26;
                }
                void f(Context ctx) {
                    if (isAtLeastO()) {
                        ctx.startForegroundService(null);
                    }
                }
            }
            "#,
        );
        assert!(!guarded(&unit, "startForegroundService", 26));
    }
}

// ============================================================================
// Kotlin sources
// ============================================================================

mod kotlin_sources {
    use super::*;

    #[test]
    fn test_guarded_if() {
        let unit = parse_kotlin(
            r#"
            fun f(ctx: Context) {
                if (Build.VERSION.SDK_INT >= 21) {
                    ctx.getDrawable(0)
                }
            }
            "#,
        );
        assert!(guarded(&unit, "getDrawable", 21));
        assert!(!guarded(&unit, "getDrawable", 22));
    }

    #[test]
    fn test_single_line_early_return() {
        let unit = parse_kotlin(
            r#"
            fun f(ctx: Context) {
                if (Build.VERSION.SDK_INT < 23) return
                ctx.checkSelfPermission("p")
            }
            "#,
        );
        assert!(guarded(&unit, "checkSelfPermission", 23));
        assert!(!guarded(&unit, "checkSelfPermission", 24));
    }

    #[test]
    fn test_error_call_exit() {
        let unit = parse_kotlin(
            r#"
            fun f(ctx: Context) {
                if (Build.VERSION.SDK_INT < 26) {
                    error("unsupported")
                }
                ctx.createNotificationChannel(channel)
            }
            "#,
        );
        assert!(guarded(&unit, "createNotificationChannel", 26));
    }

    #[test]
    fn test_expression_body_helper() {
        let unit = parse_kotlin(
            r#"
            fun isAtLeastM() = Build.VERSION.SDK_INT >= 23

            fun f(ctx: Context) {
                if (isAtLeastM()) {
                    ctx.checkSelfPermission("p")
                }
            }
            "#,
        );
        assert!(guarded(&unit, "checkSelfPermission", 23));
        assert!(!guarded(&unit, "checkSelfPermission", 24));
    }

    #[test]
    fn test_unguarded_call() {
        let unit = parse_kotlin(
            r#"
            fun f(ctx: Context) {
                ctx.getDrawable(0)
            }
            "#,
        );
        assert!(!guarded(&unit, "getDrawable", 21));
    }
}
