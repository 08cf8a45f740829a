use super::*;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Mutex as StdMutex,
    },
};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{effects::Panel, error::ResourceError, render::ImageRegion};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Request(&'static str),
    Effect(UiEffect),
}

type Log = Arc<StdMutex<Vec<Event>>>;

fn push(log: &Log, event: Event) {
    log.lock().expect("log lock").push(event);
}

struct RecordingSurface {
    log: Log,
}

impl UiSurface for RecordingSurface {
    fn apply(&self, effect: UiEffect) {
        push(&self.log, Event::Effect(effect));
    }
}

struct ScriptedConfirm {
    answer: bool,
    asked: AtomicUsize,
}

#[async_trait]
impl ConfirmPrompt for ScriptedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        assert_eq!(message, DELETE_CONFIRMATION);
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

type ListResponse = (Duration, Result<Vec<Post>, ResourceError>);

struct MockResource {
    log: Log,
    posts: StdMutex<Vec<Post>>,
    list_script: StdMutex<VecDeque<ListResponse>>,
    create_error: Option<ResourceError>,
    delete_error: Option<ResourceError>,
    create_hold: Option<Arc<Notify>>,
    deleted: StdMutex<Vec<PostId>>,
    next_id: AtomicI64,
}

impl MockResource {
    fn new(log: Log) -> Self {
        Self {
            log,
            posts: StdMutex::new(Vec::new()),
            list_script: StdMutex::new(VecDeque::new()),
            create_error: None,
            delete_error: None,
            create_hold: None,
            deleted: StdMutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn with_posts(self, posts: Vec<Post>) -> Self {
        *self.posts.lock().expect("posts lock") = posts;
        self
    }

    fn with_list_response(self, delay: Duration, result: Result<Vec<Post>, ResourceError>) -> Self {
        self.list_script
            .lock()
            .expect("script lock")
            .push_back((delay, result));
        self
    }

    fn with_create_error(mut self, err: ResourceError) -> Self {
        self.create_error = Some(err);
        self
    }

    fn with_delete_error(mut self, err: ResourceError) -> Self {
        self.delete_error = Some(err);
        self
    }

    fn with_create_hold(mut self, hold: Arc<Notify>) -> Self {
        self.create_hold = Some(hold);
        self
    }
}

#[async_trait]
impl PostsResource for MockResource {
    async fn list_posts(&self) -> Result<Vec<Post>, ResourceError> {
        push(&self.log, Event::Request("list"));
        let scripted = self.list_script.lock().expect("script lock").pop_front();
        match scripted {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(self.posts.lock().expect("posts lock").clone()),
        }
    }

    async fn create_post(&self, payload: &NewPost) -> Result<Post, ResourceError> {
        push(&self.log, Event::Request("create"));
        if let Some(hold) = &self.create_hold {
            hold.notified().await;
        }
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let post = payload.clone().into_post(PostId::from(id));
        self.posts.lock().expect("posts lock").push(post.clone());
        Ok(post)
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), ResourceError> {
        push(&self.log, Event::Request("delete"));
        self.deleted.lock().expect("deleted lock").push(id.clone());
        if let Some(err) = &self.delete_error {
            return Err(err.clone());
        }
        self.posts
            .lock()
            .expect("posts lock")
            .retain(|post| &post.id != id);
        Ok(())
    }
}

struct Harness {
    controller: PostsController,
    resource: Arc<MockResource>,
    confirm: Arc<ScriptedConfirm>,
    log: Log,
}

impl Harness {
    fn events(&self) -> Vec<Event> {
        self.log.lock().expect("log lock").clone()
    }

    fn requests(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::Request(n) if *n == name))
            .count()
    }

    fn effects(&self) -> Vec<UiEffect> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Effect(effect) => Some(effect),
                Event::Request(_) => None,
            })
            .collect()
    }

    /// Panels left visible after replaying every visibility effect in order.
    fn visible_panels(&self) -> Vec<Panel> {
        let mut visible: HashMap<Panel, bool> = HashMap::new();
        for effect in self.effects() {
            if let UiEffect::SetPanelVisible { panel, visible: v } = effect {
                visible.insert(panel, v);
            }
        }
        Panel::ALL
            .into_iter()
            .filter(|panel| visible.get(panel).copied().unwrap_or(false))
            .collect()
    }

    fn position(&self, wanted: &Event) -> usize {
        self.events()
            .iter()
            .position(|event| event == wanted)
            .unwrap_or_else(|| panic!("missing event {wanted:?}"))
    }

    fn last_position(&self, wanted: &Event) -> usize {
        self.events()
            .iter()
            .rposition(|event| event == wanted)
            .unwrap_or_else(|| panic!("missing event {wanted:?}"))
    }

    fn clear_log(&self) {
        self.log.lock().expect("log lock").clear();
    }
}

fn quick_options() -> ControllerOptions {
    ControllerOptions {
        notification_duration: Duration::from_secs(30),
        refresh_delay: Duration::from_millis(5),
    }
}

fn harness(
    configure: impl FnOnce(MockResource) -> MockResource,
    confirm_answer: bool,
    options: ControllerOptions,
) -> Harness {
    let log: Log = Arc::new(StdMutex::new(Vec::new()));
    let resource = Arc::new(configure(MockResource::new(log.clone())));
    let confirm = Arc::new(ScriptedConfirm {
        answer: confirm_answer,
        asked: AtomicUsize::new(0),
    });
    let controller = PostsController::new(
        resource.clone(),
        Arc::new(RecordingSurface { log: log.clone() }),
        confirm.clone(),
        options,
    );
    Harness {
        controller,
        resource,
        confirm,
        log,
    }
}

fn post(id: i64, title: &str) -> Post {
    Post {
        id: PostId::from(id),
        image_url: format!("https://img.example/{id}.png"),
        title: title.to_string(),
        description: format!("about {title}"),
    }
}

#[tokio::test]
async fn empty_collection_enters_empty_state() {
    let h = harness(|r| r, true, quick_options());

    assert_eq!(h.controller.fetch_all().await, FetchOutcome::Empty);

    assert_eq!(h.visible_panels(), vec![Panel::Empty]);
    let snapshot = h.controller.snapshot().await;
    assert_eq!(snapshot.view, Some(ViewState::Empty));
    assert!(snapshot.cards.is_empty());
}

#[tokio::test]
async fn loading_is_entered_before_the_request_is_issued() {
    let h = harness(|r| r, true, quick_options());
    h.controller.start().await;

    let loading_shown = h.position(&Event::Effect(UiEffect::SetPanelVisible {
        panel: Panel::Loading,
        visible: true,
    }));
    assert!(loading_shown < h.position(&Event::Request("list")));
}

#[tokio::test]
async fn populated_collection_renders_one_card_per_post_in_order() {
    let posts = vec![post(3, "third"), post(1, "first"), post(2, "second")];
    let h = harness(|r| r.with_posts(posts.clone()), true, quick_options());

    assert_eq!(h.controller.fetch_all().await, FetchOutcome::Content(3));

    assert_eq!(h.visible_panels(), vec![Panel::Content]);
    let snapshot = h.controller.snapshot().await;
    let ids: Vec<&str> = snapshot.cards.iter().map(|c| c.post_id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
    assert_eq!(snapshot.view, Some(ViewState::Content(posts)));

    let replaced = h
        .effects()
        .into_iter()
        .filter_map(|effect| match effect {
            UiEffect::ReplaceCards(cards) => Some(cards.len()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(replaced, vec![3]);
}

#[tokio::test]
async fn refetch_fully_replaces_previous_cards() {
    let h = harness(
        |r| {
            r.with_list_response(Duration::ZERO, Ok(vec![post(1, "a"), post(2, "b")]))
                .with_list_response(Duration::ZERO, Ok(vec![post(9, "z")]))
        },
        true,
        quick_options(),
    );

    h.controller.fetch_all().await;
    h.controller.refresh().await;

    let cards = h.controller.snapshot().await.cards;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].post_id, PostId::from(9));
}

#[tokio::test]
async fn markup_in_title_is_kept_as_literal_text() {
    let h = harness(
        |r| {
            r.with_posts(vec![Post {
                id: PostId::from(1),
                image_url: "u".into(),
                title: "A".into(),
                description: "d".into(),
            }])
        },
        true,
        quick_options(),
    );
    h.controller.fetch_all().await;
    let cards = h.controller.snapshot().await.cards;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title.as_str(), "A");

    let h = harness(|r| r.with_posts(vec![post(1, "<b>A</b>")]), true, quick_options());
    h.controller.fetch_all().await;
    let cards = h.controller.snapshot().await.cards;
    assert_eq!(cards[0].title.as_str(), "<b>A</b>");
}

#[tokio::test]
async fn transport_and_status_failures_produce_distinct_error_messages() {
    let h = harness(
        |r| {
            r.with_list_response(
                Duration::ZERO,
                Err(ResourceError::Transport("connection refused".into())),
            )
            .with_list_response(Duration::ZERO, Err(ResourceError::Status(500)))
        },
        true,
        quick_options(),
    );

    let FetchOutcome::Failed(transport) = h.controller.fetch_all().await else {
        panic!("transport failure expected");
    };
    assert_eq!(h.visible_panels(), vec![Panel::Error]);

    let FetchOutcome::Failed(status) = h.controller.retry().await else {
        panic!("status failure expected");
    };
    assert_eq!(h.visible_panels(), vec![Panel::Error]);

    assert_eq!(status, "HTTP error! status: 500");
    assert!(!transport.contains("500"));
    assert_ne!(transport, status);
    assert_eq!(
        h.controller.snapshot().await.view,
        Some(ViewState::Error(status.clone()))
    );
    assert!(h
        .effects()
        .contains(&UiEffect::ErrorMessage(transport.clone())));
}

#[tokio::test(start_paused = true)]
async fn slower_earlier_fetch_cannot_overwrite_newer_result() {
    let h = harness(
        |r| {
            r.with_list_response(Duration::from_millis(200), Ok(vec![post(1, "stale")]))
                .with_list_response(Duration::from_millis(10), Ok(vec![post(2, "fresh")]))
        },
        true,
        quick_options(),
    );

    let (first, second) = tokio::join!(h.controller.fetch_all(), h.controller.fetch_all());

    assert_eq!(first, FetchOutcome::Superseded);
    assert_eq!(second, FetchOutcome::Content(1));
    let cards = h.controller.snapshot().await.cards;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title.as_str(), "fresh");
    assert_eq!(h.visible_panels(), vec![Panel::Content]);
}

#[tokio::test(start_paused = true)]
async fn successful_create_sequences_feedback_then_refresh() {
    let h = harness(|r| r, true, ControllerOptions::default());

    let outcome = h
        .controller
        .create(NewPost::from_form("U", "T", "D"))
        .await;
    let created = match outcome {
        CreateOutcome::Created(post) => post,
        other => panic!("create should succeed: {other:?}"),
    };
    assert_eq!(created.title, "T");

    let engaged = h.position(&Event::Effect(UiEffect::SubmitControl { busy: true }));
    let sent = h.position(&Event::Request("create"));
    let notified = h.position(&Event::Effect(UiEffect::ShowNotification {
        text: CREATE_SUCCESS.into(),
        is_error: false,
    }));
    let cleared = h.position(&Event::Effect(UiEffect::ClearForm));
    let scrolled = h.position(&Event::Effect(UiEffect::ScrollToPosts));
    let fetched = h.position(&Event::Request("list"));
    let released = h.last_position(&Event::Effect(UiEffect::SubmitControl { busy: false }));

    assert!(engaged < sent);
    assert!(sent < notified);
    assert!(notified < cleared);
    assert!(cleared < scrolled);
    assert!(scrolled < fetched);
    assert!(fetched < released);

    assert!(!h.controller.is_submitting());
    assert_eq!(h.visible_panels(), vec![Panel::Content]);
    assert_eq!(h.controller.snapshot().await.cards.len(), 1);
}

#[tokio::test]
async fn create_is_refused_while_a_submission_is_in_flight() {
    let hold = Arc::new(Notify::new());
    let h = harness(
        |r| r.with_create_hold(hold.clone()),
        true,
        quick_options(),
    );
    let payload = NewPost::from_form("u", "t", "d");

    let first = h.controller.create(payload.clone());
    let second = async {
        tokio::task::yield_now().await;
        assert!(h.controller.is_submitting());
        let outcome = h.controller.create(payload.clone()).await;
        assert_eq!(h.requests("create"), 1);
        hold.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first, CreateOutcome::Created(_)));
    assert_eq!(second, CreateOutcome::AlreadySubmitting);
    assert_eq!(h.requests("create"), 1);
    assert!(!h.controller.is_submitting());
    assert!(!h.controller.snapshot().await.submitting);
}

#[tokio::test]
async fn failed_create_notifies_and_keeps_form() {
    let h = harness(
        |r| r.with_create_error(ResourceError::Status(422)),
        true,
        quick_options(),
    );

    let outcome = h
        .controller
        .create(NewPost::from_form("u", "t", "d"))
        .await;

    assert_eq!(
        outcome,
        CreateOutcome::Failed("HTTP error! status: 422".into())
    );
    let effects = h.effects();
    assert!(effects.contains(&UiEffect::ShowNotification {
        text: "HTTP error! status: 422".into(),
        is_error: true,
    }));
    assert!(!effects.contains(&UiEffect::ClearForm));
    assert!(!effects.contains(&UiEffect::ScrollToPosts));
    assert_eq!(h.requests("list"), 0);
    assert_eq!(
        effects.last(),
        Some(&UiEffect::SubmitControl { busy: false })
    );
    assert!(!h.controller.is_submitting());

    // The gate is usable again after a failure.
    let retry = h.controller.create(NewPost::from_form("u", "t", "d")).await;
    assert!(matches!(retry, CreateOutcome::Failed(_)));
    assert_eq!(h.requests("create"), 2);
}

#[tokio::test]
async fn gate_is_released_when_create_is_cancelled() {
    let hold = Arc::new(Notify::new());
    let h = harness(|r| r.with_create_hold(hold), true, quick_options());

    let cancelled = tokio::time::timeout(
        Duration::from_millis(20),
        h.controller.create(NewPost::from_form("u", "t", "d")),
    )
    .await;
    assert!(cancelled.is_err());
    assert!(!h.controller.is_submitting());
    assert_eq!(
        h.effects().last(),
        Some(&UiEffect::SubmitControl { busy: false })
    );
}

#[tokio::test]
async fn declined_delete_issues_no_request_and_keeps_view() {
    let h = harness(|r| r.with_posts(vec![post(1, "keep")]), false, quick_options());
    h.controller.fetch_all().await;
    let before = h.controller.snapshot().await;
    h.clear_log();

    let outcome = h.controller.delete(&PostId::from(1)).await;

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(h.confirm.asked.load(Ordering::SeqCst), 1);
    assert!(h.events().is_empty());
    let after = h.controller.snapshot().await;
    assert_eq!(after.view, before.view);
    assert_eq!(after.cards, before.cards);
}

#[tokio::test]
async fn confirmed_delete_notifies_and_refetches() {
    let h = harness(
        |r| r.with_posts(vec![post(1, "gone"), post(2, "stays")]),
        true,
        quick_options(),
    );
    h.controller.fetch_all().await;

    let target = h.controller.snapshot().await.cards[0].delete.clone();
    assert_eq!(target.activate(&h.controller).await, DeleteOutcome::Deleted);

    assert_eq!(
        h.resource.deleted.lock().expect("deleted lock").as_slice(),
        [PostId::from(1)]
    );
    let notified = h.position(&Event::Effect(UiEffect::ShowNotification {
        text: DELETE_SUCCESS.into(),
        is_error: false,
    }));
    assert!(notified < h.last_position(&Event::Request("list")));
    let cards = h.controller.snapshot().await.cards;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].post_id, PostId::from(2));
}

#[tokio::test]
async fn failed_delete_leaves_rendered_list_untouched() {
    let h = harness(
        |r| {
            r.with_posts(vec![post(1, "a"), post(2, "b")])
                .with_delete_error(ResourceError::Transport("reset by peer".into()))
        },
        true,
        quick_options(),
    );
    h.controller.fetch_all().await;
    let before = h.controller.snapshot().await;

    let outcome = h.controller.delete(&PostId::from(1)).await;

    let DeleteOutcome::Failed(message) = outcome else {
        panic!("delete should fail");
    };
    assert!(message.contains("Failed to delete post"));
    assert_eq!(h.requests("list"), 1);
    let after = h.controller.snapshot().await;
    assert_eq!(after.cards, before.cards);
    assert_eq!(after.view, before.view);
    assert_eq!(
        after.notification.map(|n| (n.text, n.is_error)),
        Some((message, true))
    );
}

#[tokio::test]
async fn image_failure_switches_rendered_card_to_placeholder() {
    let h = harness(|r| r.with_posts(vec![post(5, "pic")]), true, quick_options());
    h.controller.fetch_all().await;

    assert!(h.controller.report_image_failure(&PostId::from(5)).await);
    assert!(!h.controller.report_image_failure(&PostId::from(5)).await);
    assert!(!h.controller.report_image_failure(&PostId::from(77)).await);

    let placeholders = h
        .effects()
        .into_iter()
        .filter(|effect| matches!(effect, UiEffect::ImagePlaceholder { .. }))
        .count();
    assert_eq!(placeholders, 1);
    let cards = h.controller.snapshot().await.cards;
    assert!(matches!(
        cards[0].image,
        ImageRegion::FailedWithPlaceholder { .. }
    ));
}

#[tokio::test]
async fn toggling_form_and_scrolling_emit_effects() {
    let h = harness(|r| r, true, quick_options());

    assert!(!h.controller.toggle_form().await);
    assert!(h.controller.toggle_form().await);
    h.controller.scroll_to_posts();

    assert_eq!(
        h.effects(),
        vec![
            UiEffect::FormVisible(false),
            UiEffect::FormVisible(true),
            UiEffect::ScrollToPosts,
        ]
    );
    assert!(h.controller.snapshot().await.form_visible);
}

#[tokio::test]
async fn image_failure_is_ignored_while_error_panel_is_active() {
    let h = harness(
        |r| {
            r.with_list_response(Duration::ZERO, Ok(vec![post(5, "pic")]))
                .with_list_response(Duration::ZERO, Err(ResourceError::Status(500)))
        },
        true,
        quick_options(),
    );
    h.controller.fetch_all().await;
    h.controller.refresh().await;
    h.clear_log();

    assert!(!h.controller.report_image_failure(&PostId::from(5)).await);

    assert!(h.effects().is_empty());
    let cards = h.controller.snapshot().await.cards;
    assert!(matches!(cards[0].image, ImageRegion::Loaded { .. }));
}

#[tokio::test]
async fn empty_refetch_clears_previously_rendered_cards() {
    let h = harness(
        |r| {
            r.with_list_response(Duration::ZERO, Ok(vec![post(1, "a"), post(2, "b")]))
                .with_list_response(Duration::ZERO, Ok(Vec::new()))
        },
        true,
        quick_options(),
    );
    assert_eq!(h.controller.fetch_all().await, FetchOutcome::Content(2));
    h.clear_log();

    assert_eq!(h.controller.refresh().await, FetchOutcome::Empty);

    assert_eq!(h.visible_panels(), vec![Panel::Empty]);
    assert!(h.effects().contains(&UiEffect::ReplaceCards(Vec::new())));
    let snapshot = h.controller.snapshot().await;
    assert!(snapshot.cards.is_empty());
    assert_eq!(snapshot.view, Some(ViewState::Empty));
}
