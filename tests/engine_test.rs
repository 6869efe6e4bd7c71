use chrono::{TimeZone, Utc};
use kiln::catalog::Catalog;
use kiln::constants::BUNDLED_TEMPLATES;
use kiln::engine::{Engine, GenerationReport};
use kiln::error::{CatalogKind, Error};
use kiln::manifest::{BASE_SCRIPTS, MAPPER_SCRIPTS};
use kiln::request::{Dialect, GenerationRequest, PackageManager};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

const ALL_FEATURES: [&str; 4] = ["auth", "userCrud", "mailer", "notifications"];

fn generate(request: &GenerationRequest) -> kiln::error::Result<GenerationReport> {
    let catalog = Catalog::builtin();
    Engine::new(&catalog, BUNDLED_TEMPLATES)
        .generated_at(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
        .generate(request)
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap_or_else(|e| panic!("{relative}: {e}"))
}

fn package_json(root: &Path) -> serde_json::Value {
    serde_json::from_str(&read(root, "package.json")).unwrap()
}

#[test_log::test]
fn test_dry_run_with_auth() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("api");
    let request = GenerationRequest::new("Auth Demo", &target).with_features(&["auth"]).dry_run(true);

    let report = generate(&request).unwrap();

    assert!(report.dry_run);
    assert!(!target.exists());
    assert_eq!(report.context.feature_keys, vec!["auth".to_string()]);
    assert!(report.context.manifest.has_package("bcryptjs"));
    assert!(report.context.manifest.has_package("jsonwebtoken"));

    let scripts = report.context.manifest.scripts();
    for script in BASE_SCRIPTS {
        assert!(scripts.contains_key(script), "missing script {script}");
    }
    for script in MAPPER_SCRIPTS {
        assert!(!scripts.contains_key(script), "unexpected script {script}");
    }

    let files = report.relative_files(&target);
    assert!(files.contains(&PathBuf::from("package.json")));
    assert!(files.contains(&PathBuf::from("src/interface/http/routes/auth.ts")));
    assert!(!files.iter().any(|f| f.starts_with("prisma")));
}

#[test]
fn test_unknown_feature_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("api");
    let request = GenerationRequest::new("api", &target).with_features(&["auth", "doesNotExist"]);

    match generate(&request) {
        Err(Error::UnknownCatalogKey { kind, key, valid }) => {
            assert_eq!(kind, CatalogKind::Feature);
            assert_eq!(key, "doesNotExist");
            assert_eq!(valid, vec!["auth", "userCrud", "mailer", "notifications"]);
        }
        other => panic!("expected UnknownCatalogKey, got {other:?}"),
    }
    assert!(!target.exists());
}

#[test]
fn test_unknown_provider_and_frontend_write_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("api");

    let request = GenerationRequest::new("api", &target).with_providers(&["oracle"]);
    assert!(matches!(
        generate(&request),
        Err(Error::UnknownCatalogKey { kind: CatalogKind::Provider, .. })
    ));

    let request = GenerationRequest::new("api", &target).with_frontend("angular");
    assert!(matches!(
        generate(&request),
        Err(Error::UnknownCatalogKey { kind: CatalogKind::Frontend, .. })
    ));
    assert!(!target.exists());
}

#[test]
fn test_non_empty_destination_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "keep me").unwrap();

    let request = GenerationRequest::new("api", temp_dir.path());
    assert!(matches!(generate(&request), Err(Error::DestinationNotEmpty { .. })));
    assert_eq!(files_under(temp_dir.path()), vec![PathBuf::from("notes.txt")]);
}

#[test]
fn test_user_crud_pulls_in_auth() {
    let temp_dir = TempDir::new().unwrap();
    let request = GenerationRequest::new("api", temp_dir.path().join("api")).with_features(&["userCrud"]).dry_run(true);

    let report = generate(&request).unwrap();
    assert_eq!(report.context.feature_keys, vec!["auth", "userCrud"]);
    assert!(report.context.flags.has_auth);
}

#[test_log::test]
fn test_typescript_project_layout() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("orders");
    let request = GenerationRequest::new("Order Tracking", &target)
        .with_features(&["auth", "mailer"])
        .with_package_manager(PackageManager::Pnpm);

    let report = generate(&request).unwrap();
    assert!(!report.dry_run);

    for dir in ["src/domain", "src/application", "src/infrastructure", "src/interface", "tests", "docs", "scripts"] {
        assert!(target.join(dir).is_dir(), "missing {dir}");
    }
    assert!(target.join(".gitignore").is_file());
    assert!(!target.join("_gitignore").exists());
    assert!(target.join("tsconfig.json").is_file());
    assert!(target.join("src/types/express.d.ts").is_file());

    let package = package_json(&target);
    assert_eq!(package["name"], "order-tracking");
    assert_eq!(package["description"], "Order Tracking HTTP API");
    assert_eq!(package["scripts"]["dev"], "tsx watch src/server.ts");
    assert_eq!(package["dependencies"]["nodemailer"], "^6.9.16");

    let env = read(&target, ".env.example");
    assert!(env.starts_with("NODE_ENV=development\n"));
    assert!(env.contains("JWT_SECRET="));
    assert!(env.contains("SMTP_HOST="));

    let app = read(&target, "src/app.ts");
    assert!(app.contains("app.use('/auth', authRouter);"));
    assert!(!app.contains("usersRouter"));

    assert!(read(&target, "Dockerfile").contains("RUN pnpm install"));
}

#[test]
fn test_mapper_subtree_follows_prisma() {
    let temp_dir = TempDir::new().unwrap();

    let without = temp_dir.path().join("without");
    let report = generate(&GenerationRequest::new("api", &without).with_providers(&["postgres"])).unwrap();
    assert!(!without.join("prisma").exists());
    assert!(!without.join("src/infrastructure/persistence/prisma").exists());
    assert!(without.join("src/infrastructure/persistence/providers.ts").is_file());
    assert_eq!(report.removed.len(), 2);
    assert!(!report.files.iter().any(|f| f.starts_with(without.join("prisma"))));

    let with = temp_dir.path().join("with");
    let report = generate(&GenerationRequest::new("api", &with).with_providers(&["postgres", "prisma"])).unwrap();
    assert!(report.removed.is_empty());
    assert!(read(&with, "prisma/schema.prisma").contains("provider = \"postgresql\""));
    assert!(with.join("src/infrastructure/persistence/prisma/client.ts").is_file());
    assert_eq!(package_json(&with)["prisma"]["seed"], "tsx prisma/seed.ts");
}

#[test]
fn test_generation_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");

    for target in [&first, &second] {
        let request = GenerationRequest::new("Same Project", target)
            .with_features(&ALL_FEATURES)
            .with_providers(&["mysql", "prisma", "s3"])
            .with_frontend("nextjs");
        generate(&request).unwrap();
    }

    assert!(!dir_diff::is_different(&first, &second).unwrap());
}

#[test_log::test]
fn test_javascript_projection_has_no_types() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("js-api");
    let request = GenerationRequest::new("js api", &target)
        .with_dialect(Dialect::JavaScript)
        .with_features(&ALL_FEATURES)
        .with_providers(&["postgres", "mongodb", "prisma", "s3"])
        .with_frontend("react-vite");

    generate(&request).unwrap();

    assert!(!target.join("tsconfig.json").exists());
    assert!(!target.join("src/types").exists());
    assert!(target.join("src/server.js").is_file());
    assert!(target.join("prisma/seed.js").is_file());

    let residue = [
        "import type",
        "export type",
        "interface ",
        "implements ",
        "readonly ",
        "private ",
        ": string",
        ": number",
        ": boolean",
        ": void",
        ": unknown",
        ": Promise<",
        " as SignOptions",
        " as TokenClaims",
        "Map<string",
    ];
    let mut javascript = tree_sitter::Parser::new();
    javascript.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
    let api_files: Vec<PathBuf> = files_under(&target).into_iter().filter(|f| !f.starts_with("web")).collect();
    for file in &api_files {
        assert_ne!(file.extension().and_then(|e| e.to_str()), Some("ts"), "{} kept its extension", file.display());
        if file.extension().and_then(|e| e.to_str()) == Some("js") {
            let source = read(&target, &file.to_string_lossy());
            for token in residue {
                assert!(!source.contains(token), "{} still contains '{token}'", file.display());
            }
            let tree = javascript.parse(&source, None).unwrap();
            assert!(!tree.root_node().has_error(), "{} is not plain JavaScript:\n{source}", file.display());
        }
    }

    let repository = read(&target, "src/infrastructure/repositories/user-repository.js");
    assert!(repository.contains("export class InMemoryUserRepository {"));
    assert!(repository.contains("  users = new Map();"));
    assert!(repository.contains("  async update(id, changes) {"));
    assert!(repository.contains("role: input.role ?? 'member',"));

    let package = package_json(&target);
    assert_eq!(package["scripts"]["api"], "node src/cli/api.js");
    assert_eq!(package["prisma"]["seed"], "node prisma/seed.js");
    assert!(package["devDependencies"].get("typescript").is_none());

    // the pairing stays TypeScript
    assert!(target.join("web/src/api.ts").is_file());
    assert!(target.join("web/tsconfig.json").is_file());
}

#[test]
fn test_frontend_pairing() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("shop");
    let request = GenerationRequest::new("shop", &target).with_frontend("react-vite");

    let report = generate(&request).unwrap();

    assert_eq!(read(&target, "web/.env.local"), "VITE_API_URL=http://localhost:3333\n");
    assert!(read(&target, "web/index.html").contains("<title>Shop Console</title>"));
    assert!(read(&target, "web/src/App.tsx").contains("<h1>Shop</h1>"));
    assert_eq!(package_json(&target.join("web"))["name"], "shop-web");
    assert_eq!(package_json(&target)["scripts"]["web:dev"], "npm --prefix web run dev");
    assert!(report.files.contains(&target.join("web/.env.local")));

    let next = temp_dir.path().join("next");
    generate(&GenerationRequest::new("next", &next).with_frontend("nextjs")).unwrap();
    assert_eq!(read(&next, "web/.env.local"), "NEXT_PUBLIC_API_URL=http://localhost:3333\n");
    assert!(next.join("web/app/page.tsx").is_file());
}

#[test]
fn test_custom_template_root() {
    let templates = TempDir::new().unwrap();
    fs::create_dir_all(templates.path().join("base")).unwrap();
    fs::create_dir_all(templates.path().join("features/auth")).unwrap();
    fs::write(templates.path().join("base/README.md.j2"), "# {{ project.title }}\n").unwrap();
    fs::write(templates.path().join("features/auth/auth.txt.j2"), "{{ feature_keys | join(',') }}\n").unwrap();

    let out = TempDir::new().unwrap();
    let target = out.path().join("custom");
    let catalog = Catalog::builtin();
    let request = GenerationRequest::new("custom api", &target).with_features(&["auth"]);
    let report = Engine::new(&catalog, templates.path()).generate(&request).unwrap();

    assert_eq!(read(&target, "README.md"), "# Custom Api\n");
    assert_eq!(read(&target, "auth.txt"), "auth\n");
    assert_eq!(report.files.len(), 2);
}

#[test]
fn test_missing_base_tree_is_reported() {
    let templates = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let catalog = Catalog::builtin();
    let request = GenerationRequest::new("api", out.path().join("api"));

    let result = Engine::new(&catalog, templates.path()).generate(&request);
    assert!(matches!(result, Err(Error::TemplateError(_))));
    assert!(!out.path().join("api").exists());
}
