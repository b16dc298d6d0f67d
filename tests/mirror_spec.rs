//! End-to-end runs of the mirror against a small documentation site.

use help_mirror::paths::listing_url;
use help_mirror::{Blacklist, Mirror, MirrorConfig, MirrorError, MirrorOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEAD: &str = r#"<link type="text/css" rel="stylesheet" href="/lib/godoc/style.css">
<script type="text/javascript" src="/lib/godoc/godocs.js"></script>"#;

fn listing_page() -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Packages - The Go Programming Language</title>
{HEAD}
</head><body><div id="page"><h1>Packages</h1>
<table class="dir">
<tr><td class="pkg-name" style="padding-left: 0px;"><a href="archive/">archive</a></td></tr>
<tr><td class="pkg-name" style="padding-left: 20px;"><a href="archive/tar/">tar</a></td></tr>
<tr><td class="pkg-name" style="padding-left: 0px;"><a href="cmd/">cmd</a></td></tr>
<tr><td class="pkg-name" style="padding-left: 20px;"><a href="cmd/go/">go</a></td></tr>
<tr><td class="pkg-name" style="padding-left: 0px;"><a href="fmt/">fmt</a></td></tr>
</table></div></body></html>"#
    )
}

fn directory_page() -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>archive - The Go Programming Language</title>
{HEAD}
</head><body><div id="page"><h1>Directory /src/archive</h1>
<table class="dir"><tr><td><a href="tar/">tar</a></td></tr></table>
</div></body></html>"#
    )
}

fn tar_page() -> String {
    format!(
        r##"<!DOCTYPE html><html><head><title>tar - The Go Programming Language</title>
{HEAD}
</head><body><div id="page">
<h1>Package tar</h1>
<div id="manual-nav"><dl>
<dd><a href="#pkg-overview">Overview</a></dd>
<dd><a href="#pkg-constants">Constants</a></dd>
<dd><a href="#Header">type Header</a></dd>
<dd>&nbsp; &nbsp; <a href="#Header.FileInfo">func (h *Header) FileInfo() os.FileInfo</a></dd>
</dl>
<h3>Package files</h3>
<p><span><a href="/src/archive/tar/common.go">common.go</a></span></p>
</div>
<h2 id="pkg-constants">Constants</h2>
<pre>const (
    <span id="TypeReg">TypeReg</span> = '0'
)</pre>
<h2 id="Header">type Header</h2>
<pre>type Header struct {{
    <span id="Header.Name"></span>Name string
}}</pre>
<p>See <a href="/pkg/fmt/">fmt</a>.</p>
</div></body></html>"##
    )
}

fn fmt_page() -> String {
    format!(
        r##"<!DOCTYPE html><html><head><title>fmt - The Go Programming Language</title>
{HEAD}
</head><body><div id="page">
<h1>Package fmt</h1>
<img src="/doc/gopher/missing.png">
<div id="manual-nav"><dl>
<dd><a href="#Println">func Println(a ...interface{{}}) (n int, err error)</a></dd>
</dl></div>
<h2 id="Println">func Println</h2>
</div></body></html>"##
    )
}

fn source_page() -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>common.go - The Go Programming Language</title>
{HEAD}
</head><body><div id="page"><pre>package tar</pre>
<a href="/pkg/archive/tar/">doc</a></div></body></html>"#
    )
}

async fn mount(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn doc_site() -> MockServer {
    let server = MockServer::start().await;
    mount(&server, "/pkg/", listing_page()).await;
    mount(&server, "/pkg/archive/", directory_page()).await;
    mount(&server, "/pkg/archive/tar/", tar_page()).await;
    mount(&server, "/pkg/fmt/", fmt_page()).await;
    mount(&server, "/src/archive/tar/common.go", source_page()).await;
    mount(&server, "/lib/godoc/godocs.js", "function godocs() {}".to_string()).await;

    // every page links the stylesheet but it is downloaded once
    Mock::given(method("GET"))
        .and(path("/lib/godoc/style.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body { margin: 0 }"))
        .expect(1)
        .mount(&server)
        .await;

    server
}

fn config_with_stylesheet(dir: &Path) -> MirrorConfig {
    let stylesheet = dir.join("custom.css");
    fs::write(&stylesheet, "pre { font-size: 9pt }").unwrap();

    let mut config = MirrorConfig::default();
    config.project.stylesheet = stylesheet;
    config
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap_or_else(|e| panic!("{file}: {e}"))
}

#[tokio::test]
async fn test_mirror_writes_pages_and_project() {
    let server = doc_site().await;
    let out = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        blacklist: Blacklist::parse("cmd"),
        use_cache: false,
        ..Default::default()
    };
    let summary = Mirror::new(config_with_stylesheet(assets.path()), options)
        .unwrap()
        .run(&format!("{}/pkg/", server.uri()))
        .await
        .unwrap();

    let root = out.path();
    for file in [
        "pkg/index.html",
        "pkg/archive/index.html",
        "pkg/archive/tar/index.html",
        "pkg/fmt/index.html",
        "src/archive/tar/common.go",
        "lib/godoc/style.css",
        "lib/godoc/godocs.js",
        "custom.css",
        "Go.hhp",
        "Go.hhc",
        "Go.hhk",
    ] {
        assert!(root.join(file).is_file(), "missing {file}");
    }
    assert!(!root.join("pkg/cmd").exists());
    assert!(!root.join("doc/gopher/missing.png").exists());

    assert_eq!(summary.pages, 5);
    assert_eq!(summary.assets, 2);
    assert_eq!(summary.skipped_packages, ["cmd", "cmd/go"]);
    assert_eq!(summary.written.len(), 3);
}

#[tokio::test]
async fn test_pages_are_rewritten_for_offline_use() {
    let server = doc_site().await;
    let out = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        blacklist: Blacklist::parse("cmd"),
        use_cache: false,
        ..Default::default()
    };
    Mirror::new(config_with_stylesheet(assets.path()), options)
        .unwrap()
        .run(&listing_url(&server.uri()))
        .await
        .unwrap();

    let tar = read(out.path(), "pkg/archive/tar/index.html");
    assert!(tar.contains(r#"href="../../../lib/godoc/style.css""#));
    assert!(tar.contains(r#"src="../../../lib/godoc/godocs.js""#));
    assert!(tar.contains(r#"<link rel="stylesheet" href="../../../custom.css">"#));
    assert!(tar.contains(r#"<a href="../../fmt/index.html">fmt</a>"#));
    assert!(tar.contains(r#"<a href="../../../src/archive/tar/common.go">common.go</a>"#));

    let source = read(out.path(), "src/archive/tar/common.go");
    assert!(source.contains(r#"<a href="../../../pkg/archive/tar/index.html">doc</a>"#));
}

#[tokio::test]
async fn test_outline_and_index() {
    let server = doc_site().await;
    let out = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        blacklist: Blacklist::parse("cmd"),
        use_cache: false,
        ..Default::default()
    };
    Mirror::new(config_with_stylesheet(assets.path()), options)
        .unwrap()
        .run(&format!("{}/pkg/", server.uri()))
        .await
        .unwrap();

    let hhc = read(out.path(), "Go.hhc");
    assert!(hhc.contains(
        "\t\t<param name=\"Name\" value=\"Packages\">\r\n\t\t<param name=\"Local\" value=\"pkg/index.html\">\r\n"
    ));
    // directory pages get the folder icon
    assert!(hhc.contains(
        "\t\t<param name=\"Name\" value=\"archive\">\r\n\t\t<param name=\"Local\" value=\"pkg/archive/index.html\">\r\n\t\t<param name=\"ImageNumber\" value=\"5\">\r\n"
    ));
    // tar nests under archive
    assert!(hhc.contains("\n\t\t\t<param name=\"Name\" value=\"tar\">\r\n"));
    assert!(hhc.contains("value=\"pkg/archive/tar/index.html#Header.Name\""));
    assert!(hhc.contains("value=\"src/archive/tar/common.go\""));
    assert!(!hhc.contains("value=\"cmd\""));

    let hhk = read(out.path(), "Go.hhk");
    for keyword in [
        "tar (package archive/tar)",
        "fmt (package fmt)",
        "Header (type in archive/tar)",
        "FileInfo() (method of Header in archive/tar)",
        "TypeReg (const in archive/tar)",
        "Println() (func in fmt)",
    ] {
        assert!(
            hhk.contains(&format!("<param name=\"Name\" value=\"{keyword}\">")),
            "missing keyword {keyword}"
        );
    }
    assert!(!hhk.contains("(package archive)"));
    assert!(hhk.contains("<param name=\"Name\" value=\"tar - The Go Programming Language\">"));
    // composite order: FileInfo < fmt < Header < Println < tar < TypeReg
    let fmt = hhk.find("fmt (package fmt)").unwrap();
    let header = hhk.find("Header (type").unwrap();
    let println = hhk.find("Println()").unwrap();
    assert!(fmt < header && header < println);

    let hhp = read(out.path(), "Go.hhp");
    assert!(hhp.contains("main=\"Go\",\"Go.hhc\",\"Go.hhk\",\"pkg\\index.html\",\"pkg\\index.html\","));
    for file in [
        "pkg\\archive\\tar\\index.html",
        "src\\archive\\tar\\common.go",
        "lib\\godoc\\style.css",
        "custom.css",
    ] {
        assert!(hhp.contains(&format!("\r\n{file}\r\n")), "manifest lacks {file}");
    }
}

#[tokio::test]
async fn test_cache_database_is_created() {
    let server = doc_site().await;
    let out = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        blacklist: Blacklist::parse("cmd"),
        use_cache: true,
        ..Default::default()
    };
    let summary = Mirror::new(config_with_stylesheet(assets.path()), options)
        .unwrap()
        .run(&format!("{}/pkg/", server.uri()))
        .await
        .unwrap();

    assert!(out.path().join("cache.db").is_file());
    assert!(summary.downloads >= summary.pages);
}

#[tokio::test]
async fn test_missing_package_page_is_fatal() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/pkg/",
        r#"<table><tr><td class="pkg-name" style="padding-left: 0px;"><a href="gone/">gone</a></td></tr></table>"#
            .to_string(),
    )
    .await;

    let out = TempDir::new().unwrap();
    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };
    let err = Mirror::new(MirrorConfig::default(), options)
        .unwrap()
        .run(&format!("{}/pkg/", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, MirrorError::Fetch { .. }));
    assert!(!out.path().join("Go.hhp").exists());
}

#[tokio::test]
async fn test_listing_row_without_padding_is_fatal() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/pkg/",
        r#"<table><tr><td class="pkg-name" style="color: red"><a href="x/">x</a></td></tr></table>"#
            .to_string(),
    )
    .await;

    let out = TempDir::new().unwrap();
    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };
    let err = Mirror::new(MirrorConfig::default(), options)
        .unwrap()
        .run(&format!("{}/pkg/", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, MirrorError::Format(_)));
}

#[cfg(unix)]
fn stub_compiler(dir: &Path, status: i32) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("hhc");
    let script = format!(
        "#!/bin/sh\ntest -f Go.hhc && test -f Go.hhk || exit 2\necho \"Compiling $1\"\ntouch Go.chm\nexit {status}\n"
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[tokio::test]
async fn test_compile_after_save() {
    let server = doc_site().await;
    let out = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    let mut config = config_with_stylesheet(assets.path());
    config.project.compiler = stub_compiler(assets.path(), 1);
    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        blacklist: Blacklist::parse("cmd"),
        compile: true,
        ..Default::default()
    };
    let summary = Mirror::new(config, options)
        .unwrap()
        .run(&format!("{}/pkg/", server.uri()))
        .await
        .unwrap();

    assert!(summary.compiled);
    assert!(out.path().join("Go.chm").is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn test_compiler_failure_is_reported() {
    let server = doc_site().await;
    let out = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    let mut config = config_with_stylesheet(assets.path());
    config.project.compiler = stub_compiler(assets.path(), 0);
    let options = MirrorOptions {
        output_dir: out.path().to_path_buf(),
        blacklist: Blacklist::parse("cmd"),
        compile: true,
        ..Default::default()
    };
    let err = Mirror::new(config, options)
        .unwrap()
        .run(&format!("{}/pkg/", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, MirrorError::Compile { .. }));
    // the project is saved before the compiler runs
    assert!(out.path().join("Go.hhp").is_file());
}
