//! Permission-gated acquisition and submission through `DraftComposer`.

mod common;

use std::sync::atomic::Ordering;

use common::{composer, photos, FakeDevice, FakeSink};
use threadpost_core::capability::{PermissionKind, PickOutcome, PickerConfig};
use threadpost_core::composer::{AttachOutcome, ComposerEvent, PermissionPrompt, SubmitOutcome};
use threadpost_core::types::{Attachment, AttachmentSource, Coordinate, ReplyAudience, MAX_ATTACHMENTS};

#[tokio::test]
async fn library_pick_appends_in_selection_order() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;

    device.queue_library(PickOutcome::Picked(photos("a", 2)));
    let outcome = c.attach_from_library(id).await.unwrap();

    assert_eq!(outcome, AttachOutcome::Attached { added: 2, discarded: 0 });
    let seg = c.segment(id).unwrap();
    assert_eq!(seg.attachments, photos("a", 2));
    assert_eq!(device.requested(), vec![PermissionKind::PhotoLibrary]);
    assert_eq!(
        device.picker_configs.lock().unwrap().clone(),
        vec![PickerConfig { multi_select: true, max_count: 5 }]
    );
}

#[tokio::test]
async fn three_then_four_images_cap_at_five() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;

    device.queue_library(PickOutcome::Picked(photos("first", 3)));
    device.queue_library(PickOutcome::Picked(photos("second", 4)));
    c.attach_from_library(id).await.unwrap();
    let outcome = c.attach_from_library(id).await.unwrap();

    assert_eq!(outcome, AttachOutcome::Attached { added: 2, discarded: 2 });
    let seg = c.segment(id).unwrap();
    assert_eq!(seg.attachments.len(), MAX_ATTACHMENTS);
    assert_eq!(&seg.attachments[..3], &photos("first", 3)[..]);
    // picker ceiling stays at 5 no matter how full the segment is
    assert!(device.picker_configs.lock().unwrap().iter().all(|c| c.max_count == 5));
}

#[tokio::test]
async fn library_denial_prompts_and_changes_nothing() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let c = composer(&device, &sink).with_events(tx);
    let id = c.segments()[0].id;
    device.deny(PermissionKind::PhotoLibrary);
    device.queue_library(PickOutcome::Picked(photos("never", 1)));

    let before = c.snapshot();
    let outcome = c.attach_from_library(id).await.unwrap();

    let expected = PermissionPrompt::for_kind(PermissionKind::PhotoLibrary);
    assert_eq!(expected.title, "Photos permission not granted");
    assert_eq!(expected.message, "Please grant photos permission to use this feature");
    assert_eq!(outcome, AttachOutcome::Denied(expected.clone()));
    assert_eq!(c.snapshot(), before);
    assert!(!c.is_submitting());
    assert!(device.picker_configs.lock().unwrap().is_empty(), "picker never opened");
    assert_eq!(rx.try_recv().unwrap(), ComposerEvent::PermissionDenied(expected));
}

#[tokio::test]
async fn settings_hand_off_reaches_the_provider() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    device.deny(PermissionKind::Location);

    let id = c.segments()[0].id;
    assert!(matches!(c.attach_location(id).await.unwrap(), AttachOutcome::Denied(_)));
    c.open_settings().await.unwrap();
    assert_eq!(device.settings_opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_picker_and_camera_are_silent_no_ops() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let c = composer(&device, &sink).with_events(tx);
    let id = c.segments()[0].id;
    let before = c.snapshot();

    assert_eq!(c.attach_from_library(id).await.unwrap(), AttachOutcome::Cancelled);
    assert_eq!(c.capture_from_camera(id).await.unwrap(), AttachOutcome::Cancelled);

    assert_eq!(c.snapshot(), before);
    assert!(rx.try_recv().is_err(), "cancellation publishes nothing");
    assert!(!device.requested().contains(&PermissionKind::MediaSave));
}

#[tokio::test]
async fn camera_capture_attaches_and_saves_first_item() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;
    device.queue_camera(PickOutcome::Picked(vec![Attachment::camera("file:///shot.jpg")]));

    let outcome = c.capture_from_camera(id).await.unwrap();

    assert_eq!(outcome, AttachOutcome::Attached { added: 1, discarded: 0 });
    let seg = c.segment(id).unwrap();
    assert_eq!(seg.attachments[0].source, AttachmentSource::Camera);
    assert_eq!(device.requested(), vec![PermissionKind::Camera, PermissionKind::MediaSave]);
    assert_eq!(device.saved.lock().unwrap().clone(), vec!["file:///shot.jpg".to_owned()]);
}

#[tokio::test]
async fn camera_capture_survives_denied_or_failed_gallery_save() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;

    device.deny(PermissionKind::MediaSave);
    device.queue_camera(PickOutcome::Picked(vec![Attachment::camera("file:///one.jpg")]));
    let denied = c.capture_from_camera(id).await.unwrap();
    assert_eq!(denied, AttachOutcome::Attached { added: 1, discarded: 0 });
    assert!(device.saved.lock().unwrap().is_empty());

    device.denied.lock().unwrap().clear();
    device.fail_save.store(true, Ordering::SeqCst);
    device.queue_camera(PickOutcome::Picked(vec![Attachment::camera("file:///two.jpg")]));
    let failed = c.capture_from_camera(id).await.unwrap();
    assert_eq!(failed, AttachOutcome::Attached { added: 1, discarded: 0 });

    assert_eq!(c.segment(id).unwrap().attachments.len(), 2);
}

#[tokio::test]
async fn camera_denial_does_not_ask_for_gallery() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;
    device.deny(PermissionKind::Camera);

    let outcome = c.capture_from_camera(id).await.unwrap();
    assert_eq!(outcome, AttachOutcome::Denied(PermissionPrompt::for_kind(PermissionKind::Camera)));
    assert_eq!(device.requested(), vec![PermissionKind::Camera]);
}

#[tokio::test]
async fn second_location_overwrites_the_first() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;
    device.queue_location(37.5665, 126.978);
    device.queue_location(35.1796, 129.0756);

    c.attach_location(id).await.unwrap();
    let outcome = c.attach_location(id).await.unwrap();

    let last = Coordinate { latitude: 35.1796, longitude: 129.0756 };
    assert_eq!(outcome, AttachOutcome::Located(last));
    assert_eq!(c.segment(id).unwrap().location, Some(last));
}

#[tokio::test]
async fn location_failure_is_an_error_and_leaves_draft_alone() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;
    let before = c.snapshot();

    assert!(c.attach_location(id).await.is_err());
    assert_eq!(c.snapshot(), before);
}

#[tokio::test]
async fn stale_segment_is_ignored_without_prompting() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let head = c.segments()[0].id;
    c.update_text(head, "hi");
    let second = c.append_segment().unwrap();
    c.remove_segment(second);

    assert_eq!(c.attach_from_library(second).await.unwrap(), AttachOutcome::UnknownSegment);
    assert_eq!(c.attach_location(second).await.unwrap(), AttachOutcome::UnknownSegment);
    assert!(device.requested().is_empty());
    assert!(!c.update_text(second, "late"));
}

#[tokio::test]
async fn text_edits_proceed_while_a_pick_is_pending() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let a = c.segments()[0].id;
    c.update_text(a, "first");
    let b = c.append_segment().unwrap();

    device.hold_library.store(true, Ordering::SeqCst);
    device.queue_library(PickOutcome::Picked(photos("held", 1)));
    let picker = tokio::spawn({
        let c = c.clone();
        async move { c.attach_from_library(a).await }
    });
    while device.picker_configs.lock().unwrap().is_empty() {
        tokio::task::yield_now().await;
    }

    assert!(c.update_text(b, "typed meanwhile"));
    assert_eq!(c.segment(b).unwrap().text, "typed meanwhile");

    device.release.notify_one();
    let outcome = picker.await.unwrap().unwrap();
    assert_eq!(outcome, AttachOutcome::Attached { added: 1, discarded: 0 });
    assert_eq!(c.segment(b).unwrap().text, "typed meanwhile");
    assert_eq!(c.segment(a).unwrap().attachments, photos("held", 1));
}

#[tokio::test]
async fn segment_removed_during_pick_drops_the_result() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let head = c.segments()[0].id;
    c.update_text(head, "first");
    let b = c.append_segment().unwrap();

    device.hold_library.store(true, Ordering::SeqCst);
    device.queue_library(PickOutcome::Picked(photos("orphan", 2)));
    let picker = tokio::spawn({
        let c = c.clone();
        async move { c.attach_from_library(b).await }
    });
    while device.picker_configs.lock().unwrap().is_empty() {
        tokio::task::yield_now().await;
    }
    assert!(c.remove_segment(b));
    device.release.notify_one();

    assert_eq!(picker.await.unwrap().unwrap(), AttachOutcome::UnknownSegment);
    assert_eq!(c.segments().len(), 1);
    assert!(c.segments()[0].attachments.is_empty());
}

#[tokio::test]
async fn submit_requires_every_segment_to_have_content() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);

    assert_eq!(c.submit().await.unwrap(), SubmitOutcome::NotReady);
    assert!(sink.received().is_empty());
    assert!(!c.is_submitting());
}

#[tokio::test]
async fn successful_submit_sends_chain_resets_and_dismisses() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let c = composer(&device, &sink).with_events(tx);
    let head = c.segments()[0].id;
    c.update_text(head, "one");
    let second = c.append_segment().unwrap();
    c.update_text(second, "two");
    c.set_reply_audience(ReplyAudience::MentionedOnly);

    let outcome = c.submit().await.unwrap();

    let receipt = match outcome {
        SubmitOutcome::Posted(receipt) => receipt,
        other => panic!("expected Posted, got {other:?}"),
    };
    assert_eq!(receipt.post_ids.len(), 2);
    let sent = sink.received();
    assert_eq!(sent.len(), 1);
    let texts: Vec<_> = sent[0].segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, ["one", "two"]);
    assert_eq!(sent[0].reply_audience, ReplyAudience::MentionedOnly);

    let snap = c.snapshot();
    assert_eq!(snap.segments.len(), 1);
    assert!(snap.segments[0].text.is_empty());
    assert!(snap.segments[0].id != head);
    assert!(!snap.is_submitting);
    assert_eq!(device.dismissed.load(Ordering::SeqCst), 1);
    assert_eq!(rx.try_recv().unwrap(), ComposerEvent::Posted(receipt));
}

#[tokio::test]
async fn failed_submit_keeps_draft_and_clears_flag() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let head = c.segments()[0].id;
    c.update_text(head, "keep me");
    sink.fail_next("backend down");

    let before = c.segments();
    let err = c.submit().await.unwrap_err();

    assert!(err.to_string().contains("backend down"));
    assert_eq!(c.segments(), before);
    assert!(!c.is_submitting());
    assert_eq!(device.dismissed.load(Ordering::SeqCst), 0);

    // retry goes through
    assert!(matches!(c.submit().await.unwrap(), SubmitOutcome::Posted(_)));
}

#[tokio::test]
async fn submit_while_in_flight_is_rejected() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let head = c.segments()[0].id;
    c.update_text(head, "once");

    sink.hold.store(true, Ordering::SeqCst);
    let first = tokio::spawn({
        let c = c.clone();
        async move { c.submit().await }
    });
    while !c.is_submitting() {
        tokio::task::yield_now().await;
    }

    assert_eq!(c.submit().await.unwrap(), SubmitOutcome::InFlight);
    assert!(!c.remove_attachment(head, "file:///x.jpg"));
    assert!(!c.discard());
    assert_eq!(c.attach_from_library(head).await.unwrap(), AttachOutcome::Busy);

    sink.release.notify_one();
    assert!(matches!(first.await.unwrap().unwrap(), SubmitOutcome::Posted(_)));
    assert_eq!(sink.received().len(), 1, "exactly one submission reached the sink");
}

#[tokio::test]
async fn draft_is_frozen_while_submission_in_flight() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let head = c.segments()[0].id;
    c.update_text(head, "one");
    device.queue_library(PickOutcome::Picked(photos("p", 2)));
    c.attach_from_library(head).await.unwrap();
    let second = c.append_segment().unwrap();
    c.update_text(second, "two");
    device.queue_location(1.0, 2.0);

    sink.hold.store(true, Ordering::SeqCst);
    let first = tokio::spawn({
        let c = c.clone();
        async move { c.submit().await }
    });
    while !c.is_submitting() {
        tokio::task::yield_now().await;
    }

    let before = c.snapshot();
    assert!(!c.remove_segment(second));
    assert!(!c.update_text(head, "edited mid-flight"));
    assert_eq!(c.append_segment(), None);
    assert!(!c.remove_attachment_at(head, 0));
    assert!(!c.set_reply_audience(ReplyAudience::MentionedOnly));
    assert_eq!(c.cycle_reply_audience(), None);
    assert_eq!(c.attach_location(head).await.unwrap(), AttachOutcome::Busy);
    assert_eq!(c.snapshot(), before);

    sink.release.notify_one();
    assert!(matches!(first.await.unwrap().unwrap(), SubmitOutcome::Posted(_)));
    let sent = sink.received();
    let texts: Vec<_> = sent[0].segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, ["one", "two"]);
    assert_eq!(sent[0].segments[0].attachments.len(), 2);
    assert_eq!(sent[0].segments[0].location, None);
    assert_eq!(sent[0].reply_audience, ReplyAudience::Anyone);
}

#[tokio::test]
async fn remove_attachment_at_picks_exact_duplicate() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;
    device.queue_library(PickOutcome::Picked(photos("p", 2)));
    device.queue_library(PickOutcome::Picked(photos("p", 2)));
    c.attach_from_library(id).await.unwrap();
    c.attach_from_library(id).await.unwrap();

    assert!(c.remove_attachment_at(id, 2));
    let uris: Vec<_> =
        c.segment(id).unwrap().attachments.into_iter().map(|a| a.uri).collect();
    assert_eq!(uris, ["file:///p-0.jpg", "file:///p-1.jpg", "file:///p-1.jpg"]);
    assert!(!c.remove_attachment_at(id, 3));
}

#[tokio::test]
async fn remove_attachment_twice_is_idempotent() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let id = c.segments()[0].id;
    device.queue_library(PickOutcome::Picked(photos("p", 2)));
    c.attach_from_library(id).await.unwrap();

    assert!(c.remove_attachment(id, "file:///p-0.jpg"));
    let after = c.snapshot();
    assert!(!c.remove_attachment(id, "file:///p-0.jpg"));
    assert_eq!(c.snapshot(), after);
}

#[tokio::test]
async fn discard_resets_draft_and_dismisses() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let c = composer(&device, &sink);
    let head = c.segments()[0].id;
    c.update_text(head, "draft text");
    assert!(!c.is_pristine());

    assert!(c.discard());
    assert!(c.is_pristine());
    assert_eq!(device.dismissed.load(Ordering::SeqCst), 1);
    assert!(sink.received().is_empty());
}

#[tokio::test]
async fn clamp_publishes_event() {
    let device = FakeDevice::new();
    let sink = FakeSink::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let c = composer(&device, &sink).with_events(tx);
    let id = c.segments()[0].id;
    device.queue_library(PickOutcome::Picked(photos("big", 5)));
    device.queue_library(PickOutcome::Picked(photos("more", 2)));

    c.attach_from_library(id).await.unwrap();
    c.attach_from_library(id).await.unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        ComposerEvent::AttachmentsClamped { segment: id, discarded: 2 }
    );
}
