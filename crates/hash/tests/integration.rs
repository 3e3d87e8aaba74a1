//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use keg_hash::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_verify_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("oxidux-v0.4.0-linux");

        let data = b"verify this content";
        fs::write(&file_path, data).await.unwrap();

        let checksum = Checksum::from_data(data);
        assert!(verify_file(&file_path, &checksum).await.unwrap());

        let wrong = Checksum::from_data(b"different content");
        assert!(!verify_file(&file_path, &wrong).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_missing_file() {
        let dir = tempdir().unwrap();
        let result = Checksum::hash_file(&dir.path().join("absent")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_checksum_from_hex_errors() {
        // Too short
        assert!(Checksum::from_hex("1234").is_err());

        // Too long
        assert!(Checksum::from_hex(&"a".repeat(66)).is_err());

        // Invalid hex
        assert!(Checksum::from_hex("xyz123").is_err());
    }
}
