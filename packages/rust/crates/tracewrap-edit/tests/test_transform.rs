//! Tests for the transformation orchestrator - end-to-end wrapping behavior.

use tracewrap_edit::{
    ImportStyle, InstrumentationConfig, NodeKind, SkipReason, TransformResult, WrapConfig,
    transform_file,
};

fn run(source: &str, path: &str) -> TransformResult {
    transform_file(source, path, &WrapConfig::default()).expect("Should transform")
}

fn run_with(source: &str, path: &str, config: &WrapConfig) -> TransformResult {
    transform_file(source, path, config).expect("Should transform")
}

fn skip_config(patterns: &[&str]) -> WrapConfig {
    WrapConfig {
        skip: patterns.iter().map(ToString::to_string).collect(),
        ..WrapConfig::default()
    }
}

// ============================================================================
// Example scenarios
// ============================================================================

#[test]
fn test_function_declaration_wrapped() {
    let source = "function createUser(data) { return data; }\n";
    let result = run(source, "users.js");

    assert!(result.changed);
    assert_eq!(result.wrapped_count, 1);
    assert_eq!(
        result.modified,
        "import { traceCall } from 'autotel';\n\n\
         const createUser = traceCall('createUser', function createUser(data) { return data; });\n"
    );
}

#[test]
fn test_already_wrapped_input_unchanged() {
    let source = "import { traceCall } from 'autotel';\n\
                  const createUser = traceCall('createUser', async (data) => { return data; });\n";
    let result = run(source, "users.ts");

    assert!(!result.changed);
    assert_eq!(result.wrapped_count, 0);
    assert_eq!(result.modified, source);
    assert_eq!(result.skipped_for(SkipReason::AlreadyWrapped).count(), 1);
}

#[test]
fn test_skip_pattern_name_match() {
    let source = "function _internal() { return 1; }\n";
    let result = run_with(source, "util.ts", &skip_config(&["/^_/"]));

    assert!(!result.changed);
    assert_eq!(result.modified, source);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].reason, SkipReason::NameMatch);
    assert_eq!(result.skipped[0].identifier.as_deref(), Some("_internal"));
}

#[test]
fn test_default_export_with_helper() {
    let source = "export default function createUser() { return 1; }\n\
                  function helper() { return 2; }\n";
    let result = run(source, "users.ts");

    assert_eq!(result.wrapped_count, 2);
    assert_eq!(result.modified.matches("export default createUser").count(), 1);
    assert!(result.modified.contains(
        "const createUser = traceCall('createUser', function createUser() { return 1; });\n\
         export default createUser;"
    ));
    assert!(
        result
            .modified
            .contains("const helper = traceCall('helper', function helper() { return 2; });")
    );
}

// ============================================================================
// Properties
// ============================================================================

const MIXED: &str = r"#!/usr/bin/env node
'use strict';
/** Users module. */
import { db } from './db';

export function createUser(data: User): User {
  return db.insert(data);
}

export default async function main() {
  await createUser({ name: 'a' });
}

export const findUser = async (id: string) => db.get(id);

function overloaded(x: string): string;
function overloaded(x: number): number;
function overloaded(x: any) {
  return x;
}

function* ids() {
  yield 1;
}

class UserService {
  constructor(private readonly repo: Repo) {}

  async get(id: string) {
    return this.repo.get(id);
  }

  static create() {
    return new UserService(new Repo());
  }

  *walk() {
    yield* this.repo.all();
  }

  get size() {
    return this.repo.size;
  }
}

export const handlers = {
  ping() {
    return 'pong';
  },
  async save(input) {
    return db.save(input);
  },
};
";

#[test]
fn test_idempotence() {
    let first = run(MIXED, "users.ts");
    assert!(first.changed);

    let second = run(&first.modified, "users.ts");
    assert!(!second.changed);
    assert_eq!(second.wrapped_count, 0);
    assert_eq!(second.modified, first.modified);
}

#[test]
fn test_no_op_guarantee() {
    let source = "// comment only\nlet x = () => 1;\nexport default function () {}\n";
    let result = run(source, "a.ts");

    assert_eq!(result.wrapped_count, 0);
    assert!(!result.changed);
    assert_eq!(result.modified, source);
    assert!(!result.modified.contains("autotel"));
}

#[test]
fn test_constructor_never_candidate() {
    let result = run(MIXED, "users.ts");

    assert!(
        result
            .wrapped
            .iter()
            .all(|c| c.node.kind != NodeKind::ConstructorMethod)
    );
    let constructors: Vec<_> = result.skipped_for(SkipReason::Constructor).collect();
    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].identifier.as_deref(), Some("UserService.constructor"));
}

#[test]
fn test_anonymous_default_export_skipped() {
    let source = "export default function () { return 1; }\n";
    let result = run(source, "a.js");

    assert_eq!(result.wrapped_count, 0);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].reason, SkipReason::AnonymousDefaultExport);
}

#[test]
fn test_skip_pattern_precedence_over_wrapped_state() {
    let source = "const _load = traceCall('_load', () => 1);\n";
    let result = run_with(source, "a.ts", &skip_config(&["^_"]));

    assert_eq!(result.skipped[0].reason, SkipReason::NameMatch);
}

#[test]
fn test_skip_pattern_matches_method_name() {
    let source = "class Repo {\n  _cache() {}\n  find() {}\n}\n";
    let result = run_with(source, "repo.ts", &skip_config(&["^_"]));

    assert_eq!(result.span_names(), vec!["Repo.find"]);
    assert_eq!(result.skipped_for(SkipReason::NameMatch).count(), 1);
}

#[test]
fn test_literal_span_name_in_every_replacement() {
    let result = run(MIXED, "users.ts");
    for target in &result.wrapped {
        let literal = format!("traceCall('{}',", target.span_name);
        assert!(
            target.replacement.contains(&literal),
            "missing {literal} in {}",
            target.replacement
        );
    }
}

#[test]
fn test_mixed_module_outcomes() {
    let result = run(MIXED, "users.ts");

    assert_eq!(
        result.span_names(),
        vec![
            "createUser",
            "main",
            "findUser",
            "overloaded",
            "ids",
            "UserService.get",
            "UserService.create",
            "handlers.ping",
            "handlers.save",
        ]
    );
    assert_eq!(result.skipped_for(SkipReason::OverloadSignature).count(), 2);
    assert_eq!(result.skipped_for(SkipReason::Generator).count(), 1);
    assert_eq!(result.modified.matches("export default main;").count(), 1);
    assert_eq!(result.modified.matches("from 'autotel'").count(), 1);

    // Hashbang and directive stay first; the import lands before the
    // existing imports.
    assert!(result.modified.starts_with(
        "#!/usr/bin/env node\n'use strict';\nimport { traceCall } from 'autotel';\n/** Users module. */\nimport { db } from './db';"
    ));
    assert!(
        result
            .modified
            .contains("export const findUser = traceCall('findUser', async (id: string) => db.get(id));")
    );
    assert!(result.modified.contains(
        "  async get(id: string) {\n    return traceCall('UserService.get', async () => {\n      return this.repo.get(id);\n    })();\n  }"
    ));
    assert!(result.modified.contains(
        "function overloaded(x: number): number;\n\
         function overloaded(x: any) {\n  return traceCall('overloaded', () => {\n    return x;\n  })();\n}"
    ));
    assert!(result.modified.contains("const ids = traceCall('ids', function* ids() {"));
    assert!(result.modified.contains("  get size() {\n    return this.repo.size;\n  }"));
}

#[test]
fn test_overloaded_function_wrapped_in_place() {
    let source = "function a(x: string): string;\n\
                  function a(x: number): number;\n\
                  function a(x: any) { return x; }\n";
    let result = run(source, "overloads.ts");

    assert!(result.changed);
    assert_eq!(result.wrapped_count, 1);
    assert_eq!(result.skipped_for(SkipReason::OverloadSignature).count(), 2);
    assert_eq!(
        result.modified,
        "import { traceCall } from 'autotel';\n\n\
         function a(x: string): string;\n\
         function a(x: number): number;\n\
         function a(x: any) {\n  return traceCall('a', () => { return x; })();\n}\n"
    );

    let again = run(&result.modified, "overloads.ts");
    assert!(!again.changed);
    assert_eq!(again.skipped_for(SkipReason::AlreadyWrapped).count(), 1);
}

#[test]
fn test_crlf_line_endings_kept() {
    let source = "export default function main() {\r\n  return 1;\r\n}\r\n\r\n\
                  class Job {\r\n  run() {\r\n    return 2;\r\n  }\r\n}\r\n";
    let result = run(source, "main.ts");

    assert_eq!(result.wrapped_count, 2);
    assert!(!result.modified.replace("\r\n", "").contains('\n'));
    assert!(result.modified.contains("});\r\nexport default main;\r\n"));
    assert!(result.modified.starts_with("import { traceCall } from 'autotel';\r\n\r\n"));
}

#[test]
fn test_literal_method_keys_in_span_names() {
    let source = "export const routes = {\n  'get-user'() {},\n  [Symbol.iterator]() {},\n};\n";
    let result = run(source, "routes.js");

    assert_eq!(
        result.span_names(),
        vec!["routes.get-user", "routes.Symbol.iterator"]
    );
    assert!(result.modified.contains("traceCall('routes.get-user', () => {})();"));
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_existing_import_not_duplicated() {
    let source = "import { traceCall } from 'autotel';\nfunction a() {}\n";
    let result = run(source, "a.ts");

    assert!(result.changed);
    assert_eq!(result.modified.matches("import { traceCall }").count(), 1);
}

#[test]
fn test_commonjs_require_inserted() {
    let source = "const fs = require('fs');\nfunction read() { return fs.readFileSync('x'); }\nmodule.exports = { read };\n";
    let result = run(source, "read.js");

    assert!(
        result
            .modified
            .starts_with("const { traceCall } = require('autotel');\nconst fs = require('fs');")
    );
}

#[test]
fn test_existing_require_counts() {
    let source = "const { traceCall } = require('autotel');\nfunction a() {}\n";
    let result = run(source, "a.cjs");

    assert_eq!(result.modified.matches("require('autotel')").count(), 1);
}

#[test]
fn test_local_entry_definition_is_not_rebound() {
    let source = "function traceCall(name, fn) { return fn; }\nfunction work() { return 1; }\n";
    let result = run(source, "local.js");

    assert_eq!(result.wrapped_count, 1);
    assert_eq!(
        result.modified,
        "function traceCall(name, fn) { return fn; }\n\
         const work = traceCall('work', function work() { return 1; });\n"
    );
    let skipped: Vec<_> = result.skipped_for(SkipReason::NameMatch).collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].identifier.as_deref(), Some("traceCall"));

    assert!(!run(&result.modified, "local.js").changed);
}

#[test]
fn test_custom_instrumentation_call() {
    let config = WrapConfig {
        instrumentation: InstrumentationConfig {
            function_name: "span".to_string(),
            module_path: "@acme/otel".to_string(),
            import_style: ImportStyle::Esm,
        },
        ..WrapConfig::default()
    };
    let result = run_with("const run = () => 1;\n", "job.js", &config);

    assert_eq!(
        result.modified,
        "import { span } from '@acme/otel';\n\nconst run = span('run', () => 1);\n"
    );
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn test_name_pattern_with_file() {
    let config = WrapConfig {
        name_pattern: Some("{file}.{name}".to_string()),
        ..WrapConfig::default()
    };
    let result = run_with(
        "export class Orders { list() { return []; } }\n",
        "src/orders.ts",
        &config,
    );

    assert_eq!(result.span_names(), vec!["orders.Orders.list"]);
}

#[test]
fn test_span_name_is_escaped() {
    let config = WrapConfig {
        name_pattern: Some("it's {name}".to_string()),
        ..WrapConfig::default()
    };
    let result = run_with("function a() {}\n", "a.ts", &config);

    assert!(result.modified.contains(r"traceCall('it\'s a', function a() {})"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_parse_error_is_fatal() {
    let err = transform_file("function broken( {\n", "a.ts", &WrapConfig::default())
        .expect_err("Should fail");
    assert!(matches!(err, tracewrap_edit::EditError::Parse(_)));
}

#[test]
fn test_invalid_skip_pattern() {
    let err = transform_file("function a() {}", "a.ts", &skip_config(&["(oops"]))
        .expect_err("Should fail");
    assert!(matches!(err, tracewrap_edit::EditError::Pattern(_)));
}

#[test]
fn test_jsx_file() {
    let source = "export const Button = ({ label }) => <button>{label}</button>;\n";
    let result = run(source, "Button.jsx");

    assert!(
        result
            .modified
            .contains("export const Button = traceCall('Button', ({ label }) => <button>{label}</button>);")
    );
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_result_serializes_camel_case() {
    let source = "class Svc {\n  constructor() {}\n  run() {}\n}\n";
    let result = run(source, "svc.ts");

    let json = serde_json::to_value(&result).expect("Should serialize");
    assert_eq!(json["changed"], true);
    assert_eq!(json["wrappedCount"], 1);
    assert_eq!(json["skipped"][0]["reason"], "constructor");
    assert_eq!(json["skipped"][0]["kind"], "ConstructorMethod");
    assert_eq!(json["wrapped"][0]["spanName"], "Svc.run");
    assert_eq!(json["wrapped"][0]["node"]["line"], 3);
}
