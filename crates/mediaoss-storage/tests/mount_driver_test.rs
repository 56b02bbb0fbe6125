#[path = "helpers/mod.rs"]
mod helpers;

use chrono::Local;
use helpers::{MemoryBackend, TestStorage};
use mediaoss_core::TransferError;
use mediaoss_storage::{
    DriverFactory, Provider, StorageConfig, StorageDriver, StorageError, UploadedFile,
};
use std::sync::Arc;

#[tokio::test]
async fn test_upload_local_file_into_mount() {
    let storage = TestStorage::new();
    let driver = DriverFactory::new()
        .create(storage.mount_config(7), "aliYun")
        .await
        .unwrap();
    assert!(driver.is_mount());

    let source = storage.source_file("a.png", b"\x89PNG");
    let outcome = driver.upload_local_file(&source, None, true).await;

    assert_eq!(outcome.status(), 1);
    let today = Local::now().format("%Y%m%d").to_string();
    let url = outcome.url().unwrap();
    assert!(url.starts_with(&format!("/image/7/{}/", today)), "{}", url);
    assert_eq!(url, format!("/{}a.png", driver.key_prefix()));
    assert!(storage.mounted(outcome.key().unwrap()).is_file());
    assert!(source.exists());
}

#[tokio::test]
async fn test_move_consumes_source_and_returns_full_host() {
    let storage = TestStorage::new();
    let config = StorageConfig {
        return_host: true,
        ..storage.mount_config(2)
    };
    let driver = DriverFactory::new().create(config, "qiNiu").await.unwrap();

    let source = storage.source_file("clip.mp4", b"video");
    let outcome = driver
        .upload_local_file(&source, Some("my clip.mp4"), false)
        .await;

    assert!(outcome.is_success(), "{}", outcome.message);
    assert_eq!(
        outcome.url().unwrap(),
        format!("{}/{}myclip.mp4", helpers::HOST, driver.key_prefix())
    );
    assert!(!source.exists());
}

#[tokio::test]
async fn test_missing_source_fails() {
    let storage = TestStorage::new();
    let driver = DriverFactory::new()
        .create(storage.mount_config(1), "aliYun")
        .await
        .unwrap();

    let outcome = driver
        .upload_local_file(&storage.scratch.join("nope.png"), None, true)
        .await;
    assert_eq!(outcome.status(), 0);
    assert!(outcome.data.is_none());
}

#[tokio::test]
async fn test_special_upload_uses_new_base() {
    let storage = TestStorage::new();
    let driver = DriverFactory::new()
        .create(storage.mount_config(12), "aliYun")
        .await
        .unwrap();

    let source = storage.source_file("daily.csv", b"a,b\n1,2\n");
    let outcome = driver
        .upload_local_special_file(&source, " /exports/daily/ ", None)
        .await;

    assert!(outcome.is_success(), "{}", outcome.message);
    let key = outcome.key().unwrap();
    let parts: Vec<&str> = key.split('/').collect();
    assert_eq!(parts.len(), 7, "{}", key);
    assert_eq!(&parts[..2], ["exports", "daily"]);
    assert_eq!(parts[4], "12");
    assert_eq!(parts[5].len(), 6);
    assert_eq!(parts[6], "daily.csv");
    assert!(storage.mounted(key).is_file());
    assert!(!source.exists());
}

#[tokio::test]
async fn test_delete_missing_file_succeeds() {
    let storage = TestStorage::new();
    let driver = DriverFactory::new()
        .create(storage.mount_config(1), "aliYun")
        .await
        .unwrap();

    let outcome = driver.del_file("/image/1/20200101/000000/missing.png").await;
    assert_eq!(outcome.status(), 1);
    assert_eq!(outcome.message, "file does not exist, no deletion needed");
}

#[tokio::test]
async fn test_delete_by_url_and_key() {
    let storage = TestStorage::new();
    let driver = DriverFactory::new()
        .create(storage.mount_config(1), "qiNiu")
        .await
        .unwrap();

    let first = storage.source_file("one.png", b"1");
    let second = storage.source_file("two.png", b"2");
    let one = driver.upload_local_file(&first, None, false).await;
    let two = driver.upload_local_file(&second, None, false).await;

    let by_url = format!("{}/{}", helpers::HOST, one.key().unwrap());
    assert_eq!(driver.del_file(&by_url).await.message, "file deleted");
    assert_eq!(driver.del_file(two.url().unwrap()).await.message, "file deleted");

    assert!(!storage.mounted(one.key().unwrap()).exists());
    assert!(!storage.mounted(two.key().unwrap()).exists());
}

#[tokio::test]
async fn test_delete_outside_mount_is_rejected() {
    let storage = TestStorage::new();
    let driver = DriverFactory::new()
        .create(storage.mount_config(1), "aliYun")
        .await
        .unwrap();

    let outside = storage.source_file("keep.txt", b"keep");
    let outcome = driver.del_file("/../scratch/keep.txt").await;
    assert_eq!(outcome.status(), 0);
    assert!(outside.exists());

    let foreign = driver.del_file("https://elsewhere.example.com/a.png").await;
    assert_eq!(foreign.status(), 0);
}

#[tokio::test]
async fn test_browser_upload() {
    let storage = TestStorage::new();
    let driver = DriverFactory::new()
        .create(storage.mount_config(4), "aliYun")
        .await
        .unwrap();

    let temp_path = storage.source_file("php7f3a", b"%PDF-1.4");
    let file = UploadedFile {
        name: "my <report>.pdf".to_string(),
        temp_path: temp_path.clone(),
        size: 8,
        content_type: "application/pdf".to_string(),
        error: TransferError::Ok,
    };

    let outcome = driver.upload(&file, None).await;
    assert!(outcome.is_success(), "{}", outcome.message);
    assert_eq!(
        outcome.key().unwrap(),
        format!("{}myreport.pdf", driver.key_prefix())
    );
    assert!(!temp_path.exists());
}

#[tokio::test]
async fn test_browser_upload_rejections_write_nothing() {
    let storage = TestStorage::new();
    let config = StorageConfig {
        max_length: 16,
        ..storage.mount_config(4)
    };
    let driver = DriverFactory::new().create(config, "aliYun").await.unwrap();
    let prefix_dir = storage.mounted(driver.key_prefix());

    let temp_path = storage.source_file("upload", b"<html></html>");
    let html = UploadedFile {
        name: "page.html".to_string(),
        temp_path: temp_path.clone(),
        size: 13,
        content_type: "text/html".to_string(),
        error: TransferError::Ok,
    };
    assert_eq!(driver.upload(&html, None).await.status(), 0);

    let partial = UploadedFile {
        content_type: "image/png".to_string(),
        error: TransferError::Partial,
        ..html.clone()
    };
    let outcome = driver.upload(&partial, None).await;
    assert_eq!(outcome.status(), 0);
    assert!(outcome.message.contains(TransferError::Partial.message()));

    let oversized = UploadedFile {
        content_type: "image/png".to_string(),
        size: 17,
        ..html.clone()
    };
    assert_eq!(driver.upload(&oversized, None).await.status(), 0);

    assert!(temp_path.exists());
    assert!(helpers::is_empty_dir(&prefix_dir));
}

#[tokio::test]
async fn test_missing_mount_downgrades_to_remote() {
    let storage = TestStorage::new();
    let config = StorageConfig {
        base_path: Some(storage.temp_dir.path().join("not-mounted").to_string_lossy().into_owned()),
        staging_dir: storage.staging_dir().to_string_lossy().into_owned(),
        ..storage.mount_config(7)
    };
    assert!(config.is_mount);

    let backend = Arc::new(MemoryBackend::default());
    let factory = DriverFactory::new().with_backend(Provider::AliYun, backend.clone());
    let driver = factory.create(config.clone(), "aliYun").await.unwrap();
    assert!(!driver.is_mount());

    let source = storage.source_file("a.png", b"png");
    let outcome = driver.upload_local_file(&source, None, true).await;
    assert!(outcome.is_success(), "{}", outcome.message);
    assert!(backend.contains(outcome.key().unwrap()));

    // Without a backend client the downgraded driver cannot be built
    let result = DriverFactory::new().create(config, "aliYun").await;
    assert!(matches!(result, Err(StorageError::ConfigError(_))));
}

#[tokio::test]
async fn test_mount_root_must_be_configured() {
    let result = DriverFactory::new()
        .create(StorageConfig::default(), "qiNiu")
        .await;
    let err = result.err().unwrap();
    assert!(err.is_setup_error());
}
