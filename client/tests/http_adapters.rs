//! End-to-end tests for the HTTP adapters against an in-process stub service.

#[path = "support/stub_service.rs"]
mod stub_service;

use std::path::PathBuf;

use rstest::{fixture, rstest};
use shortflix_client::domain::ports::{CredentialStore, FixtureCatalogueApi};
use shortflix_client::domain::{
    ErrorCategory, FilterPatch, MediaFile, QueryParams, SessionError, SessionPhase, ShortDraft,
};
use shortflix_client::outbound::storage::FileCredentialStore;
use shortflix_client::{ClientSettings, ShortflixClient};
use stub_service::StubService;
use tempfile::TempDir;

struct Context {
    stub: StubService,
    token_dir: TempDir,
}

impl Context {
    fn token_path(&self) -> PathBuf {
        self.token_dir.path().join(".shortflix").join("auth_token")
    }

    fn stored_token(&self) -> Option<String> {
        FileCredentialStore::new(self.token_path())
            .expect("store")
            .load()
            .expect("load")
            .map(|token| token.expose().to_owned())
    }

    fn seed_token(&self, token: &str, username: &str) {
        self.stub.issue_token(token, username);
        std::fs::create_dir_all(self.token_path().parent().expect("parent")).expect("token dir");
        std::fs::write(self.token_path(), token).expect("seed token");
    }

    fn client(&self) -> ShortflixClient {
        self.client_at(QueryParams::default())
    }

    fn client_at(&self, initial: QueryParams) -> ShortflixClient {
        let settings = ClientSettings {
            api_base_url: Some(self.stub.base_url().to_string()),
            token_path: Some(self.token_path()),
            debounce_ms: Some(50),
            request_timeout_secs: Some(5),
        };
        ShortflixClient::from_settings(&settings, initial).expect("client wires")
    }
}

#[fixture]
fn context() -> Context {
    let stub = StubService::start()
        .with_account("alice", "password123")
        .with_short(1, "Cat compilation", "cats being cats", &["funny", "cats"])
        .with_short(2, "Beach sunset", "golden hour", &["travel"])
        .with_short(3, "Cats at the beach", "", &["travel", "cats"]);
    Context {
        stub,
        token_dir: tempfile::tempdir().expect("temp dir"),
    }
}

#[rstest]
#[tokio::test]
async fn login_persists_token_and_attaches_it_afterwards(context: Context) {
    let client = context.client();
    client.session().initialize().await;
    assert!(
        context.stub.requests_to("/api/auth/users/me/").is_empty(),
        "no probe without a stored token"
    );

    let identity = client
        .session()
        .login("alice", "password123")
        .await
        .expect("login succeeds");

    assert_eq!(identity.username, "alice");
    assert_eq!(context.stored_token().as_deref(), Some("tok-alice"));
    let probes = context.stub.requests_to("/api/auth/users/me/");
    assert_eq!(probes.len(), 1);
    assert_eq!(probes[0].authorization.as_deref(), Some("Token tok-alice"));

    client.listing().refresh();
    client.settled_listing().await.expect("listing");
    let listing = context.stub.requests_to("/api/shorts/");
    assert_eq!(
        listing.last().and_then(|r| r.authorization.as_deref()),
        Some("Token tok-alice")
    );
}

#[rstest]
#[tokio::test]
async fn failed_login_surfaces_server_message_and_stores_nothing(context: Context) {
    let client = context.client();
    client.session().initialize().await;

    let error = client
        .session()
        .login("alice", "wrong-password")
        .await
        .expect_err("login fails");

    assert_eq!(error.category(), ErrorCategory::Validation);
    assert_eq!(
        error.user_message().as_deref(),
        Some("non_field_errors: Unable to log in with provided credentials.")
    );
    assert!(context.stored_token().is_none());
    assert_eq!(client.session().snapshot().phase, SessionPhase::Anonymous);
}

#[rstest]
#[tokio::test]
async fn startup_restores_session_from_token_file(context: Context) {
    context.seed_token("tok-alice", "alice");
    let client = context.client();

    client.start().await;

    let session = client.session().snapshot();
    assert_eq!(session.phase, SessionPhase::Authenticated);
    assert_eq!(
        session.identity.map(|identity| identity.email),
        Some("alice@example.com".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn startup_with_stale_token_falls_back_to_anonymous(context: Context) {
    std::fs::create_dir_all(context.token_path().parent().expect("parent")).expect("token dir");
    std::fs::write(context.token_path(), "tok-expired").expect("seed token");
    let client = context.client();

    client.start().await;

    assert_eq!(client.session().snapshot().phase, SessionPhase::Anonymous);
    assert!(context.stored_token().is_none());
}

#[rstest]
#[tokio::test]
async fn rejected_token_is_dropped_and_never_reattached(context: Context) {
    context.seed_token("tok-alice", "alice");
    let client = context.client();
    client.start().await;
    client.settled_listing().await.expect("first listing");
    assert!(client.session().is_authenticated());

    context.stub.revoke_all_tokens();
    client.listing().refresh();
    let error = client
        .settled_listing()
        .await
        .expect_err("revoked token is refused");

    assert_eq!(error.category(), ErrorCategory::AuthRejected);
    assert!(client.session().identity().is_none());
    assert!(context.stored_token().is_none());

    context.stub.clear_requests();
    client.listing().refresh();
    let listing = client.settled_listing().await.expect("anonymous listing");
    assert_eq!(listing.results.len(), 3);
    let requests = context.stub.requests_to("/api/shorts/");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].authorization.is_none());
}

#[rstest]
#[tokio::test]
async fn listing_query_carries_only_non_empty_filters(context: Context) {
    let client = context.client();

    let listing = client
        .search_now(FilterPatch {
            title: Some("cat".into()),
            description: Some(String::new()),
            tag: Some("travel".into()),
        })
        .await
        .expect("listing");

    let request = context
        .stub
        .requests_to("/api/shorts/")
        .pop()
        .expect("listing request");
    assert_eq!(request.method, "GET");
    assert_eq!(request.query, "title=cat&tag=travel");
    let titles: Vec<_> = listing.results.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Cats at the beach"]);
}

#[rstest]
#[tokio::test]
async fn unfiltered_listing_sends_no_query_string(context: Context) {
    let client = context.client();
    client.start().await;

    let listing = client.settled_listing().await.expect("listing");

    assert_eq!(listing.results.len(), 3);
    let request = context
        .stub
        .requests_to("/api/shorts/")
        .pop()
        .expect("listing request");
    assert_eq!(request.query, "");
}

#[rstest]
#[tokio::test]
async fn debounced_edits_reach_the_service_once(context: Context) {
    let client = context.client();

    client.listing().set_filter(FilterPatch::title("c"));
    client.listing().set_filter(FilterPatch::title("ca"));
    client.listing().set_filter(FilterPatch::title("cat"));
    let listing = client.settled_listing().await.expect("listing");

    let requests = context.stub.requests_to("/api/shorts/");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query, "title=cat");
    assert_eq!(listing.results.len(), 2);
}

#[rstest]
#[tokio::test]
async fn selection_parameter_opens_the_matching_short(context: Context) {
    let client = context.client_at(QueryParams::parse("video=2"));
    client.start().await;
    let listing = client.settled_listing().await.expect("listing");

    let selected = client
        .router()
        .selected(&listing.results)
        .expect("overlay open");
    assert_eq!(selected.title, "Beach sunset");

    let stale = context.client_at(QueryParams::parse("video=999"));
    stale.start().await;
    let listing = stale.settled_listing().await.expect("listing");
    assert!(stale.router().selected(&listing.results).is_none());
    assert!(stale.router().drop_unmatched_selection(&listing.results));
    assert!(stale.router().selection_key().is_none());
}

#[rstest]
#[tokio::test]
async fn register_chains_into_login(context: Context) {
    let client = context.client();
    client.session().initialize().await;

    let identity = client
        .session()
        .register("bob", "bob@example.com", "password123")
        .await
        .expect("registration succeeds");

    assert_eq!(identity.username, "bob");
    assert_eq!(context.stored_token().as_deref(), Some("tok-bob"));
    let paths: Vec<_> = context
        .stub
        .requests()
        .into_iter()
        .map(|request| request.path)
        .collect();
    assert_eq!(
        paths,
        vec![
            "/api/auth/users/",
            "/api/auth/token/login/",
            "/api/auth/users/me/"
        ]
    );
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_shows_field_message_verbatim(context: Context) {
    let client = context.client();
    client.session().initialize().await;

    let error = client
        .session()
        .register("alice", "other@example.com", "password123")
        .await
        .expect_err("username taken");

    assert_eq!(
        error.user_message().as_deref(),
        Some("username: A user with that username already exists.")
    );
    assert!(context.stub.requests_to("/api/auth/token/login/").is_empty());
}

#[rstest]
#[tokio::test]
async fn short_password_is_refused_before_any_request(context: Context) {
    let client = context.client();

    let error = client
        .session()
        .register("carol", "carol@example.com", "short")
        .await
        .expect_err("password too short");

    assert!(matches!(error, SessionError::InvalidRegistration(_)));
    assert!(context.stub.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn logout_invalidates_server_token_and_clears_file(context: Context) {
    context.seed_token("tok-alice", "alice");
    let client = context.client();
    client.session().initialize().await;

    client.session().logout().await;

    let logout = context.stub.requests_to("/api/auth/token/logout/");
    assert_eq!(logout.len(), 1);
    assert_eq!(logout[0].authorization.as_deref(), Some("Token tok-alice"));
    assert!(context.stored_token().is_none());
    assert!(!client.session().is_authenticated());
}

#[rstest]
#[tokio::test]
async fn upload_posts_multipart_fields_and_refreshes(context: Context) {
    let client = context.client();
    client.start().await;
    client.settled_listing().await.expect("first listing");
    client
        .session()
        .login("alice", "password123")
        .await
        .expect("login");

    let mut draft = ShortDraft::new("Sunset", "golden hour");
    draft.add_tag("beach");
    draft.add_tag("travel");
    draft.video = Some(MediaFile {
        file_name: "clip.mp4".into(),
        content_type: "video/mp4".into(),
        bytes: b"fake-video".to_vec(),
    });
    let created = client.upload(&draft).await.expect("upload");
    let listing = client.settled_listing().await.expect("refreshed listing");

    assert_eq!(created.id.get(), 103);
    assert_eq!(listing.results.len(), 4);
    let upload = context
        .stub
        .requests()
        .into_iter()
        .find(|request| request.method == "POST" && request.path == "/api/shorts/")
        .expect("upload request");
    assert_eq!(upload.authorization.as_deref(), Some("Token tok-alice"));
    let body = upload.body_text();
    assert!(body.contains("name=\"title\""));
    assert!(body.contains("Sunset"));
    assert_eq!(body.matches("name=\"tags\"").count(), 2);
    assert!(body.contains("name=\"video_file\"; filename=\"clip.mp4\""));
    assert!(!body.contains("name=\"thumbnail\""));
}

#[rstest]
#[tokio::test]
async fn anonymous_upload_is_refused_locally(context: Context) {
    let client = context.client();
    client.session().initialize().await;
    let mut draft = ShortDraft::new("Sunset", "");
    draft.video = Some(MediaFile {
        file_name: "clip.mp4".into(),
        content_type: "video/mp4".into(),
        bytes: vec![0],
    });

    let error = client.upload(&draft).await.expect_err("not signed in");

    assert!(matches!(error, SessionError::NotAuthenticated));
    assert!(context.stub.requests_to("/api/shorts/").is_empty());
}

#[tokio::test]
async fn fixture_catalogue_refuses_uploads() {
    use shortflix_client::domain::ports::CatalogueApi;

    let error = FixtureCatalogueApi
        .create_short(&ShortDraft::default())
        .await
        .expect_err("read-only fixture");
    assert_eq!(error.category(), ErrorCategory::Validation);
}
