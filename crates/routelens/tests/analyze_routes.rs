//! End-to-end analysis of small Express projects written to disk.

mod common;

use common::{analyze, create_test_project, fields, route};
use routelens::{AnalyzeError, DiagnosticKind, RouteAnalyzer, analyze_routes};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_mounted_router_with_branches() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            (
                "src/app.js",
                r#"
                const express = require("express");
                const usersRouter = require("./routes/users");
                const app = express();
                app.use(express.json());
                app.use("/api", usersRouter);
                app.listen(3000);
                "#,
            ),
            (
                "src/routes/users.js",
                r#"
                const express = require("express");
                const router = express.Router();
                router.get("/users/:id", (req, res) => {
                    const { id } = req.params;
                    if (!id) return res.status(400).json({ error: "missing id" });
                    res.status(200).json({ id, name: "a" });
                });
                module.exports = router;
                "#,
            ),
        ],
    );

    let report = analyze(&root, "src/app.js");
    assert_eq!(report.routes.len(), 1);
    assert_eq!(report.files.len(), 2);

    let users = route(&report, "GET", "/api/users/:id");
    assert_eq!(fields(&users.req.params), vec!["id"]);
    assert!(users.req.body.is_empty());

    let missing = users.responses.branch("if !id").unwrap();
    assert_eq!(missing.status, vec![400]);
    assert_eq!(missing.json, vec![json!({"error": "missing id"})]);

    assert_eq!(users.responses.default.status, vec![200]);
    let body = &users.responses.default.json[0];
    assert_eq!(body["name"], json!("a"));
    assert_eq!(body["id"]["identifier"], json!("req.params.id"));
}

#[test]
fn test_router_mounted_in_its_own_module() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[(
            "server.js",
            r#"
            const app = express();
            const router = express.Router();
            router.get("/items", (req, res) => res.json([{ sku: "A1" }]));
            app.use("/v1/", router);
            "#,
        )],
    );

    let report = analyze(&root, "server.js");
    let items = route(&report, "GET", "/v1/items");
    assert_eq!(items.responses.default.json, vec![json!([{"sku": "A1"}])]);
}

#[test]
fn test_request_fields_are_unioned() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[(
            "app.js",
            r#"
            app.post("/orders", (req, res) => {
                const { customerId, items } = req.body;
                if (req.body.coupon) {
                    res.set("X-Coupon", req.body.coupon);
                }
                const page = req.query.page;
                const key = req.headers["X-Api-Key"];
                res.status(201).json({ customerId, count: items.length, page });
            });
            "#,
        )],
    );

    let report = analyze(&root, "app.js");
    let orders = route(&report, "POST", "/orders");
    assert_eq!(fields(&orders.req.body), vec!["customerId", "items", "coupon"]);
    assert_eq!(fields(&orders.req.query), vec!["page"]);
    assert_eq!(fields(&orders.req.headers), vec!["x-api-key"]);
    assert!(orders.req.params.is_empty());

    let coupon = orders.responses.branch("if req.body.coupon").unwrap();
    assert_eq!(coupon.headers.len(), 1);
    assert_eq!(coupon.headers[0].key, "X-Coupon");
    assert_eq!(orders.responses.default.status, vec![201]);
}

#[test]
fn test_branch_responses_are_exclusive() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[(
            "app.js",
            r#"
            app.delete("/sessions/:id", async (req, res) => {
                try {
                    const removed = await store.remove(req.params.id);
                    if (removed) {
                        res.sendStatus(204);
                    } else {
                        res.status(404).send("not found");
                    }
                } catch (err) {
                    res.status(500).json({ error: err.message });
                }
            });
            "#,
        )],
    );

    let report = analyze(&root, "app.js");
    let responses = &route(&report, "DELETE", "/sessions/:id").responses;

    assert!(responses.default.status.is_empty());
    assert_eq!(responses.branch("if removed").unwrap().status, vec![204]);
    assert_eq!(responses.branch("else").unwrap().status, vec![404]);
    assert_eq!(responses.branch("else").unwrap().send, vec![json!("not found")]);
    assert_eq!(responses.branch("catch").unwrap().status, vec![500]);
    assert_eq!(responses.branches.len(), 3);
}

#[test]
fn test_spreads_merge_and_cycles_terminate() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[(
            "app.js",
            r#"
            const defaults = { page: 1, size: 20 };
            const a = { ...b };
            const b = { ...a };
            app.get("/list", (req, res) => {
                const meta = { ...defaults, size: 50, sort: "name" };
                res.json({ meta, data: [] });
            });
            app.get("/loop", (req, res) => res.json(a));
            "#,
        )],
    );

    let report = analyze(&root, "app.js");
    let list = route(&report, "GET", "/list");
    assert_eq!(
        list.responses.default.json,
        vec![json!({"meta": {"page": 1, "size": 50, "sort": "name"}, "data": []})]
    );

    let looped = &route(&report, "GET", "/loop").responses.default.json;
    assert_eq!(looped.len(), 1);
    assert!(looped[0].is_object());
}

#[test]
fn test_controller_and_service_across_files() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            (
                "src/index.ts",
                r#"
                import express from "express";
                import productRoutes from "@/routes/products";
                const app = express();
                app.use("/products", productRoutes);
                "#,
            ),
            (
                "src/routes/products.ts",
                r#"
                import { Router } from "express";
                import * as controller from "../controllers/product.controller";
                const router = Router();
                router.get("/", controller.list);
                export default router;
                "#,
            ),
            (
                "src/controllers/product.controller.ts",
                r#"
                import type { Request, Response } from "express";
                import { ProductService } from "../services/product.service";

                const productService = new ProductService();

                export async function list(req: Request, res: Response) {
                    const products = await productService.getAll();
                    res.json(products);
                }
                "#,
            ),
            (
                "src/services/product.service.ts",
                r#"
                export interface Product {
                    id: number;
                    name: string;
                    price: number;
                    createdAt: Date;
                }

                export class ProductService {
                    async getAll(): Promise<Product[]> {
                        return db.query("select * from products");
                    }
                }
                "#,
            ),
        ],
    );

    let report = RouteAnalyzer::new()
        .entry(root.join("src/index.ts"))
        .cwd(&root)
        .path_alias("@", "./src")
        .analyze()
        .unwrap();

    assert_eq!(report.files.len(), 4);
    let list = route(&report, "GET", "/products/");
    assert_eq!(
        list.responses.default.json,
        vec![json!([{
            "id": 1,
            "name": "Sample Name",
            "price": 99.99,
            "createdAt": "2024-01-01T00:00:00.000Z",
        }])]
    );
}

#[test]
fn test_broken_and_vendored_files_do_not_stop_analysis() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            (
                "app.js",
                r#"
                const broken = require("./broken");
                const vendored = require("./node_modules/left-pad");
                app.get("/ok", (req, res) => res.send("ok"));
                "#,
            ),
            ("broken.js", "module.exports = {"),
            (
                "node_modules/left-pad/index.js",
                r#"app.get("/vendored", (req, res) => res.send("no"));"#,
            ),
        ],
    );

    let report = analyze(&root, "app.js");
    assert_eq!(report.routes.len(), 1);
    assert_eq!(report.routes[0].path, "/ok");
    assert_eq!(report.files.len(), 1);
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::ParseFailed)
    );
}

#[test]
fn test_analysis_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            (
                "app.js",
                r#"
                const users = require("./users");
                app.use("/users", users);
                app.get("/", (req, res) => res.json({ ok: true }));
                "#,
            ),
            (
                "users.js",
                r#"
                const router = express.Router();
                router.get("/:id", (req, res) => {
                    if (!req.params.id) {
                        return res.status(400).json({ error: "id" });
                    }
                    res.json({ id: req.params.id, tags: ["a", "b"] });
                });
                module.exports = router;
                "#,
            ),
        ],
    );

    let first = serde_json::to_string(&analyze(&root, "app.js").routes).unwrap();
    let second = serde_json::to_string(&analyze(&root, "app.js").routes).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("/users/:id"));
}

#[test]
fn test_entry_must_be_readable_source() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(&temp, &[("notes.txt", "hello")]);

    let missing = analyze_routes(root.join("missing.js"));
    assert!(matches!(missing, Err(AnalyzeError::EntryUnreadable { .. })));

    let text = RouteAnalyzer::new()
        .entry(root.join("notes.txt"))
        .cwd(&root)
        .analyze();
    assert!(matches!(text, Err(AnalyzeError::UnsupportedEntry { .. })));
}
