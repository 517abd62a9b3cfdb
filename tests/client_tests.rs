//! Grid client against a live server on an ephemeral localhost port.

mod common;

use common::Site;
use photo_grid::client::{ClientError, GridLoader, HttpPageSource, PageSource};
use std::net::TcpListener as StdListener;
use tokio::net::TcpListener;

fn can_bind_localhost() -> bool {
    StdListener::bind("127.0.0.1:0").is_ok()
}

/// Serve the site's router in the background; returns the base URL.
async fn spawn_server(site: &Site) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = site.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn loader_pages_through_thirty_five() {
    if !can_bind_localhost() {
        eprintln!("skipping: cannot bind 127.0.0.1");
        return;
    }
    let site = Site::numbered(35);
    let url = spawn_server(&site).await;

    let source = HttpPageSource::new(&url).unwrap();
    let mut loader = GridLoader::from_first_page(source, 30, None).await.unwrap();
    assert_eq!(loader.images().len(), 30);
    assert_eq!(loader.total(), 35);
    assert_eq!(loader.next_page(), 2);

    assert_eq!(loader.load_more().await.unwrap(), 5);
    assert_eq!(loader.images().len(), 35);
    assert_eq!(loader.images()[34].title, "Photo 035");
    assert!(!loader.has_more());

    // Nothing left; no request, nothing added.
    assert_eq!(loader.load_more().await.unwrap(), 0);
    assert_eq!(loader.next_page(), 3);
}

#[tokio::test]
async fn load_all_with_small_pages_and_collection() {
    if !can_bind_localhost() {
        eprintln!("skipping: cannot bind 127.0.0.1");
        return;
    }
    let site = Site::new();
    let mut yaml = String::from("collections:\n  - { id: even }\nimages:\n");
    for i in 1..=10 {
        site.image(&format!("src/gallery/{i}.png"), 2, 2);
        let collections = if i % 2 == 0 { "[even]" } else { "[]" };
        yaml.push_str(&format!(
            "  - {{ path: {i}.png, meta: {{ title: \"{i}\", collections: {collections} }} }}\n"
        ));
    }
    site.manifest(&yaml);
    let url = spawn_server(&site).await;

    let source = HttpPageSource::new(&url).unwrap();
    let mut loader = GridLoader::from_first_page(source, 2, Some("even".into()))
        .await
        .unwrap();
    loader.load_all().await.unwrap();

    let titles: Vec<&str> = loader.images().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["2", "4", "6", "8", "10"]);
    assert_eq!(loader.total(), 5);
}

#[tokio::test]
async fn server_error_surfaces_as_status() {
    if !can_bind_localhost() {
        eprintln!("skipping: cannot bind 127.0.0.1");
        return;
    }
    let site = Site::new();
    site.image("src/gallery/a.png", 2, 2);
    site.manifest("images:\n  - { path: a.png, meta: { title: A, collections: [ghost] } }\n");
    let url = spawn_server(&site).await;

    let source = HttpPageSource::new(&url).unwrap();
    let err = source.fetch_page(1, 30, None).await.unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("Failed to fetch images"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
