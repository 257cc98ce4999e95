//! Property-based tests for path joining and whole-run determinism.

mod common;

use common::{analyze, create_test_project};
use proptest::prelude::*;
use routelens::join_route_path;
use tempfile::TempDir;

const METHODS: &[&str] = &["get", "post", "put", "delete", "patch"];

fn route_source(routes: &[(usize, String, u16)]) -> String {
    let mut source = String::from("const app = express();\n");
    for (method, segment, status) in routes {
        source.push_str(&format!(
            "app.{}(\"/{segment}/:id\", (req, res) => {{\n  if (!req.params.id) {{\n    return res.status(400).json({{ error: \"{segment}\" }});\n  }}\n  res.status({status}).json({{ id: req.params.id, name: req.body.name }});\n}});\n",
            METHODS[*method]
        ));
    }
    source
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_join_never_doubles_slashes(
        prefix in "(/[a-z]{1,8}){0,3}/?",
        path in "/[a-z:]{0,10}",
    ) {
        let joined = join_route_path(&prefix, &path);
        prop_assert!(!joined.contains("//"), "{prefix} + {path} = {joined}");
        prop_assert!(joined.starts_with(&prefix));
        prop_assert!(joined.ends_with(path.trim_start_matches('/')));
    }

    #[test]
    fn prop_empty_prefix_keeps_path(path in "/[a-z/:]{0,16}") {
        prop_assert_eq!(join_route_path("", &path), path);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_analysis_is_deterministic(
        routes in prop::collection::vec((0..METHODS.len(), "[a-z]{1,8}", 200u16..300), 1..6),
    ) {
        let temp = TempDir::new().unwrap();
        let source = route_source(&routes);
        let root = create_test_project(&temp, &[("app.js", source.as_str())]);

        let first = analyze(&root, "app.js");
        let second = analyze(&root, "app.js");
        prop_assert_eq!(
            serde_json::to_string(&first.routes).unwrap(),
            serde_json::to_string(&second.routes).unwrap()
        );

        prop_assert_eq!(first.routes.len(), routes.len());
        for (found, (method, segment, status)) in first.routes.iter().zip(&routes) {
            prop_assert_eq!(&found.method, &METHODS[*method].to_uppercase());
            prop_assert_eq!(&found.path, &format!("/{segment}/:id"));
            prop_assert_eq!(&found.responses.default.status, &vec![*status]);
            prop_assert_eq!(
                &found.responses.branch("if !req.params.id").unwrap().status,
                &vec![400]
            );
            prop_assert!(found.req.params.contains("id"));
            prop_assert!(found.req.body.contains("name"));
        }
    }
}
