//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use keg_errors::{Error, NetworkError};
    use keg_events::{channel, AppEvent, DownloadEvent};
    use keg_hash::Checksum;
    use keg_net::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn fast_client(retries: u32) -> NetClient {
        NetClient::new(NetConfig {
            retry_count: retries,
            retry_delay: Duration::from_millis(0),
            timeout: Duration::from_secs(10),
            ..NetConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_download_file() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let content = b"#!/bin/sh\necho oxidux\n";
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v0.4.0/oxidux-v0.4.0-linux");
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(content);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("oxidux-v0.4.0-linux");
        let client = fast_client(0);
        let url = server.url("/v0.4.0/oxidux-v0.4.0-linux");

        let result = download_file(&client, &url, &dest, None, &tx)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(result.size, content.len() as u64);
        assert_eq!(result.sha256, Checksum::from_data(content));
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), content);
        assert!(!partial_path(&dest).exists());

        let mut saw_start = false;
        let mut saw_complete = false;
        while let Ok(message) = rx.try_recv() {
            match message.event {
                AppEvent::Download(DownloadEvent::Started { .. }) => saw_start = true,
                AppEvent::Download(DownloadEvent::Completed { .. }) => saw_complete = true,
                _ => {}
            }
        }
        assert!(saw_start);
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_download_with_checksum_verification() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let content = b"verified content";
        let expected = Checksum::from_data(content);
        server.mock(|when, then| {
            when.method(GET).path("/verified");
            then.status(200).body(content);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("verified");
        let client = fast_client(0);

        let result = download_file(&client, &server.url("/verified"), &dest, Some(&expected), &tx)
            .await
            .unwrap();
        assert_eq!(result.sha256, expected);
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_checksum_mismatch_leaves_no_file() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/tampered");
            then.status(200).body("tampered content");
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("tampered");
        let client = fast_client(0);
        let expected = Checksum::from_data(b"original content");

        let err = download_file(&client, &server.url("/tampered"), &dest, Some(&expected), &tx)
            .await
            .unwrap_err();

        match err {
            Error::Network(NetworkError::ChecksumMismatch { expected: e, actual }) => {
                assert_eq!(e, expected.to_hex());
                assert_eq!(actual, Checksum::from_data(b"tampered content").to_hex());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());

        let mut saw_failed = false;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Download(DownloadEvent::Failed { failure, .. }) = message.event {
                assert_eq!(failure.code.as_deref(), Some("network.checksum_mismatch"));
                saw_failed = true;
            }
        }
        assert!(saw_failed);
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let temp = tempdir().unwrap();
        let client = fast_client(3);
        let err = download_file(
            &client,
            &server.url("/missing"),
            &temp.path().join("missing"),
            None,
            &tx,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
        assert_eq!(mock.hits(), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        });

        let client = fast_client(2);
        let err = fetch_text(&client, &server.url("/flaky"), &tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 503, .. })
        ));
        assert_eq!(mock.hits(), 3);

        let retries = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|m| matches!(m.event, AppEvent::Download(DownloadEvent::Retrying { .. })))
            .count();
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_unbounded_retry_count_is_accepted() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/formula.toml");
            then.status(200).body("name = \"oxidux\"");
        });

        let client = fast_client(u32::MAX);
        let body = fetch_text(&client, &server.url("/formula.toml"), &tx)
            .await
            .unwrap();

        assert_eq!(body, "name = \"oxidux\"");
        assert_eq!(mock.hits(), 1);
    }

    #[tokio::test]
    async fn test_fetch_text_and_check_url() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/formula.toml");
            then.status(200).body("name = \"oxidux\"");
        });
        server.mock(|when, then| {
            when.method(httpmock::Method::HEAD).path("/formula.toml");
            then.status(200);
        });

        let client = fast_client(0);
        let text = fetch_text(&client, &server.url("/formula.toml"), &tx)
            .await
            .unwrap();
        assert_eq!(text, "name = \"oxidux\"");
        assert!(check_url(&client, &server.url("/formula.toml")).await.unwrap());
        assert!(!check_url(&client, &server.url("/absent")).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let (tx, _rx) = channel();
        let temp = tempdir().unwrap();
        let err = download_file(&fast_client(0), "not a url", &temp.path().join("x"), None, &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::InvalidUrl(_))));
    }
}
