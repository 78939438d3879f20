//! Video publish, fetch, update, and delete lifecycle, including the
//! duration capture, publish-visibility, and bulk-retirement semantics.

mod support;

use clipforge_core::error::CoreError;
use clipforge_model::{MediaKind, Patch, PrincipalId, VideoDraft, VideoUpdate};

use support::{
    StoreEvent, TEST_VIDEO_DURATION, harness, publish_video,
    register_principal, temp_upload,
};

#[tokio::test]
async fn publish_captures_duration_and_defaults() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;

    let video = publish_video(&h, owner.id).await;

    assert_eq!(video.duration_secs, TEST_VIDEO_DURATION);
    assert_eq!(video.views, 0);
    assert!(video.is_published);
    assert_eq!(video.video_file.kind(), MediaKind::Video);
    assert_eq!(video.thumbnail.kind(), MediaKind::Image);
    assert!(h.catalog.get(video.id).is_some());
}

#[tokio::test]
async fn publish_requires_both_files_and_text_fields() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let draft = VideoDraft {
        title: "Clip".to_string(),
        description: "About the clip".to_string(),
    };

    let err = h
        .videos
        .publish(owner.id, draft.clone(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::BadRequest(_)));
    assert_eq!(err.to_string(), "video file is required");

    let file = temp_upload(b"video-bytes");
    let err = h
        .videos
        .publish(owner.id, draft.clone(), Some(file.path()), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "thumbnail file is required");

    let thumbnail = temp_upload(b"thumb-bytes");
    let err = h
        .videos
        .publish(
            owner.id,
            VideoDraft {
                title: "  ".to_string(),
                description: "About the clip".to_string(),
            },
            Some(file.path()),
            Some(thumbnail.path()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "title and description are required");
}

#[tokio::test]
async fn publish_store_failure_creates_no_record() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;

    h.store.fail_next_store();
    let file = temp_upload(b"video-bytes");
    let thumbnail = temp_upload(b"thumb-bytes");
    let err = h
        .videos
        .publish(
            owner.id,
            VideoDraft {
                title: "Clip".to_string(),
                description: "About the clip".to_string(),
            },
            Some(file.path()),
            Some(thumbnail.path()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UploadFailed(_)));
    assert_eq!(err.to_string(), "Error while uploading video");
}

#[tokio::test]
async fn fetch_hides_unpublished_videos_from_non_owners() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    let unpublished = h
        .videos
        .toggle_publish(video.id, owner.id)
        .await
        .unwrap();
    assert!(!unpublished.is_published);

    let err = h
        .videos
        .fetch(video.id, PrincipalId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
    assert_eq!(err.to_string(), "Video not found");

    // The owner still sees it.
    h.videos.fetch(video.id, owner.id).await.unwrap();
}

#[tokio::test]
async fn update_patches_text_without_touching_assets() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    let updated = h
        .videos
        .update(
            video.id,
            owner.id,
            VideoUpdate {
                title: Patch::Set("Renamed".to_string()),
                description: Patch::Keep,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.description, video.description);
    assert_eq!(updated.thumbnail.url(), video.thumbnail.url());
    assert!(h.store.retired_urls().is_empty());
    assert_eq!(h.catalog.update_count(), 1);
}

#[tokio::test]
async fn update_with_thumbnail_commits_once_then_retires_old() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;
    let old_thumbnail = video.thumbnail.url().to_string();

    let upload = temp_upload(b"new-thumb");
    let updated = h
        .videos
        .update(
            video.id,
            owner.id,
            VideoUpdate {
                title: Patch::Set("Renamed".to_string()),
                description: Patch::Keep,
            },
            Some(upload.path()),
        )
        .await
        .unwrap();

    // Patched fields and the new reference land in one record write.
    assert_eq!(h.catalog.update_count(), 1);
    let record = h.catalog.get(video.id).unwrap();
    assert_eq!(record.title, "Renamed");
    assert_eq!(record.thumbnail.url(), updated.thumbnail.url());
    assert_ne!(record.thumbnail.url(), old_thumbnail);

    let events = h.store.events();
    let stored_new = events
        .iter()
        .position(|e| {
            *e == StoreEvent::Stored(updated.thumbnail.url().to_string())
        })
        .unwrap();
    let retired_old = events
        .iter()
        .position(|e| *e == StoreEvent::Retired(old_thumbnail.clone()))
        .unwrap();
    assert!(stored_new < retired_old);
}

#[tokio::test]
async fn update_requires_ownership() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    let err = h
        .videos
        .update(
            video.id,
            PrincipalId::new(),
            VideoUpdate {
                title: Patch::Set("Hijacked".to_string()),
                description: Patch::Keep,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));
    assert_eq!(err.to_string(), "Only the owner may modify this video");
}

#[tokio::test]
async fn update_requires_some_change() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    let err = h
        .videos
        .update(video.id, owner.id, VideoUpdate::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::BadRequest(_)));
    assert_eq!(err.to_string(), "No update fields provided");
}

#[tokio::test]
async fn delete_retires_all_assets_then_removes_the_record() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    let failures = h.videos.delete(video.id, owner.id).await.unwrap();

    assert!(failures.is_empty());
    assert!(h.catalog.get(video.id).is_none());
    let retired = h.store.retired_urls();
    assert!(retired.contains(&video.video_file.url().to_string()));
    assert!(retired.contains(&video.thumbnail.url().to_string()));
}

#[tokio::test]
async fn delete_proceeds_when_a_retire_fails() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    h.store.fail_retire_of(video.video_file.url());
    let failures = h.videos.delete(video.id, owner.id).await.unwrap();

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].reference.url(), video.video_file.url());
    assert!(
        h.catalog.get(video.id).is_none(),
        "record deletion proceeds despite the orphaned object"
    );
    assert_eq!(
        h.store.retired_urls(),
        vec![video.thumbnail.url().to_string()]
    );
}

#[tokio::test]
async fn delete_requires_ownership() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    let err = h
        .videos
        .delete(video.id, PrincipalId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));
    assert!(h.catalog.get(video.id).is_some());
}

#[tokio::test]
async fn toggle_publish_flips_the_flag_for_the_owner_only() {
    let h = harness();
    let owner = register_principal(&h, "alice", "alice@example.com").await;
    let video = publish_video(&h, owner.id).await;

    let toggled = h
        .videos
        .toggle_publish(video.id, owner.id)
        .await
        .unwrap();
    assert!(!toggled.is_published);
    let toggled = h
        .videos
        .toggle_publish(video.id, owner.id)
        .await
        .unwrap();
    assert!(toggled.is_published);

    let err = h
        .videos
        .toggle_publish(video.id, PrincipalId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));
}
