//! Integration tests for events

#[cfg(test)]
mod tests {
    use keg_events::*;
    use keg_types::{PlatformTag, Version};

    #[tokio::test]
    async fn test_emitter_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first.event,
            AppEvent::General(GeneralEvent::Error { .. })
        ));
        assert_eq!(first.meta.level, EventLevel::Error);

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second.event,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
        assert_eq!(second.meta.level, EventLevel::Debug);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_event_source_and_level() {
        let event = AppEvent::Install(InstallEvent::Started {
            package: "oxidux".into(),
            version: Version::new(0, 4, 0),
            platform: PlatformTag::Linux,
        });
        assert_eq!(event.event_source(), EventSource::INSTALL);
        assert_eq!(event.log_level(), tracing::Level::INFO);

        let event = AppEvent::Platform(PlatformEvent::Unsupported {
            os: "windows".into(),
        });
        assert_eq!(event.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_event_serialization_is_tagged_by_domain() {
        let event = AppEvent::Platform(PlatformEvent::Selected {
            os: "linux".into(),
            tag: PlatformTag::Linux,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "platform");
        assert_eq!(json["event"]["event_type"], "selected");
        assert_eq!(json["event"]["tag"], "linux");
    }
}
