use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::index::model::IndexSnapshot;

fn with_snapshot(
    snapshot: Arc<IndexSnapshot>,
) -> impl Filter<Extract = (Arc<IndexSnapshot>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || snapshot.clone())
}

/// Read-only query routes over one finished index snapshot. Every route
/// replies 200 with JSON; unknown keys resolve to an empty object.
pub fn build_routes(
    snapshot: Arc<IndexSnapshot>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let home = warp::path::end()
        .and(with_snapshot(snapshot.clone()))
        .map(|snapshot: Arc<IndexSnapshot>| {
            warp::reply::json(&serde_json::json!({
                "packages": "/package/<pkg_name>",
                "distributions": "/dist/<release>/<dist>/<arch>",
                "architecture": "/arch/<arch>",
                "version": "/version/<pkg_name>",
                "built_at": snapshot.built_at.to_rfc3339(),
                "source_files": snapshot.source_files,
            }))
        });

    let package_all = warp::path!("package")
        .and(with_snapshot(snapshot.clone()))
        .map(|snapshot: Arc<IndexSnapshot>| warp::reply::json(&snapshot.query_packages(None)));

    let package_one = warp::path!("package" / String)
        .and(with_snapshot(snapshot.clone()))
        .map(|pkg: String, snapshot: Arc<IndexSnapshot>| {
            warp::reply::json(&snapshot.query_packages(Some(&pkg)))
        });

    let dist_all = warp::path!("dist")
        .and(with_snapshot(snapshot.clone()))
        .map(|snapshot: Arc<IndexSnapshot>| {
            warp::reply::json(&snapshot.query_dist(None, None, None))
        });

    let dist_release = warp::path!("dist" / String)
        .and(with_snapshot(snapshot.clone()))
        .map(|release: String, snapshot: Arc<IndexSnapshot>| {
            warp::reply::json(&snapshot.query_dist(Some(&release), None, None))
        });

    let dist_distribution = warp::path!("dist" / String / String)
        .and(with_snapshot(snapshot.clone()))
        .map(|release: String, distribution: String, snapshot: Arc<IndexSnapshot>| {
            warp::reply::json(&snapshot.query_dist(Some(&release), Some(&distribution), None))
        });

    let dist_architecture = warp::path!("dist" / String / String / String)
        .and(with_snapshot(snapshot.clone()))
        .map(
            |release: String, distribution: String, arch: String, snapshot: Arc<IndexSnapshot>| {
                warp::reply::json(&snapshot.query_dist(
                    Some(&release),
                    Some(&distribution),
                    Some(&arch),
                ))
            },
        );

    let arch_all = warp::path!("arch")
        .and(with_snapshot(snapshot.clone()))
        .map(|snapshot: Arc<IndexSnapshot>| warp::reply::json(&snapshot.query_arch(None)));

    let arch_one = warp::path!("arch" / String)
        .and(with_snapshot(snapshot.clone()))
        .map(|arch: String, snapshot: Arc<IndexSnapshot>| {
            warp::reply::json(&snapshot.query_arch(Some(&arch)))
        });

    let version_all = warp::path!("version")
        .and(with_snapshot(snapshot.clone()))
        .map(|snapshot: Arc<IndexSnapshot>| warp::reply::json(&snapshot.query_latest(None)));

    let version_one = warp::path!("version" / String)
        .and(with_snapshot(snapshot))
        .map(|pkg: String, snapshot: Arc<IndexSnapshot>| {
            warp::reply::json(&snapshot.query_latest(Some(&pkg)))
        });

    warp::get().and(
        home.or(package_one)
            .or(package_all)
            .or(dist_architecture)
            .or(dist_distribution)
            .or(dist_release)
            .or(dist_all)
            .or(arch_one)
            .or(arch_all)
            .or(version_one)
            .or(version_all),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build::IndexBuilder;
    use crate::repo::scan::scan_repository;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_packages(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_snapshot() -> (TempDir, Arc<IndexSnapshot>) {
        let temp = TempDir::new().unwrap();
        write_packages(
            temp.path(),
            "stable/main/binary-amd64/Packages",
            "Package: foo\nVersion: 1.0\nArchitecture: amd64\nFilename: pool/f/foo_1.0.deb\n",
        );
        write_packages(
            temp.path(),
            "testing/main/binary-amd64/Packages",
            "Package: foo\nVersion: 2.0\nArchitecture: amd64\nFilename: pool/f/foo_2.0.deb\n",
        );

        let files = scan_repository(temp.path());
        let snapshot =
            IndexBuilder::new("http://example.org/info/", "http://example.org/debian/")
                .build(&files);
        (temp, Arc::new(snapshot))
    }

    async fn get_json(snapshot: Arc<IndexSnapshot>, path: &str) -> Value {
        let routes = build_routes(snapshot);
        let response = warp::test::request().path(path).reply(&routes).await;
        assert_eq!(response.status(), 200, "GET {}", path);
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_home_lists_the_route_map() {
        let (_temp, snapshot) = sample_snapshot();

        let home = get_json(snapshot, "/").await;
        assert_eq!(home["packages"], "/package/<pkg_name>");
        assert_eq!(home["distributions"], "/dist/<release>/<dist>/<arch>");
        assert_eq!(home["source_files"], 2);
    }

    #[tokio::test]
    async fn test_package_routes() {
        let (_temp, snapshot) = sample_snapshot();

        let all = get_json(snapshot.clone(), "/package").await;
        assert!(all["foo"].is_object());

        let foo = get_json(snapshot.clone(), "/package/foo").await;
        assert!(foo["1.0"].is_object());
        assert!(foo["2.0"].is_object());

        assert_eq!(
            get_json(snapshot, "/package/unknown").await,
            serde_json::json!({})
        );
    }

    #[tokio::test]
    async fn test_dist_routes_by_prefix() {
        let (_temp, snapshot) = sample_snapshot();

        assert_eq!(get_json(snapshot.clone(), "/dist").await, serde_json::json!({}));

        let release = get_json(snapshot.clone(), "/dist/stable").await;
        assert!(release["main"].is_object());

        let slot = get_json(snapshot.clone(), "/dist/stable/main/amd64").await;
        assert_eq!(slot["file"], "stable/main/binary-amd64/Packages");
        assert_eq!(slot["packages"]["foo"]["Version"], "1.0");

        assert_eq!(
            get_json(snapshot.clone(), "/dist/oldstable").await,
            serde_json::json!({})
        );
        assert_eq!(
            get_json(snapshot, "/dist/stable/contrib/amd64").await,
            serde_json::json!({})
        );
    }

    #[tokio::test]
    async fn test_arch_routes() {
        let (_temp, snapshot) = sample_snapshot();

        let amd64 = get_json(snapshot.clone(), "/arch/amd64").await;
        assert!(amd64["foo"]["1.0"].is_object());
        assert!(amd64["foo"]["2.0"].is_object());

        assert_eq!(get_json(snapshot, "/arch/mips").await, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_version_routes() {
        let (_temp, snapshot) = sample_snapshot();

        let foo = get_json(snapshot.clone(), "/version/foo").await;
        assert_eq!(foo["current_version"], "2.0");
        assert_eq!(foo["info_url"], "http://example.org/info/foo");
        assert_eq!(foo["deb_url"], "http://example.org/debian/pool/f/foo_2.0.deb");

        let all = get_json(snapshot.clone(), "/version").await;
        assert_eq!(all["foo"]["version"], "2.0");

        assert_eq!(
            get_json(snapshot, "/version/unknown").await,
            serde_json::json!({})
        );
    }

    #[tokio::test]
    async fn test_only_get_is_served() {
        let (_temp, snapshot) = sample_snapshot();
        let routes = build_routes(snapshot);

        let response = warp::test::request()
            .method("POST")
            .path("/package/foo")
            .reply(&routes)
            .await;
        assert_eq!(response.status(), 405);
    }
}
