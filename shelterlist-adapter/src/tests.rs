use crate::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use shelterlist::{
    AnimalRecord, FetchError, FilterCriteria, ListingOptions, ProcessStatus, Sex, ViewportSize,
};
use tokio::sync::{mpsc, oneshot};

struct Pending {
    request: PageRequest,
    reply: oneshot::Sender<Result<Vec<AnimalRecord>, FetchError>>,
}

/// Hands every request to the test, which decides when and how it completes.
struct ScriptedSource {
    requests: mpsc::UnboundedSender<Pending>,
}

#[async_trait]
impl RemoteListSource for ScriptedSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<AnimalRecord>, FetchError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Pending {
                request: request.clone(),
                reply,
            })
            .map_err(|_| FetchError::transport("test closed"))?;
        rx.await
            .unwrap_or_else(|_| Err(FetchError::transport("reply dropped")))
    }
}

fn scripted() -> (Arc<ScriptedSource>, mpsc::UnboundedReceiver<Pending>) {
    let (requests, rx) = mpsc::unbounded_channel();
    (Arc::new(ScriptedSource { requests }), rx)
}

fn desktop_options() -> ListingOptions {
    ListingOptions::new().with_initial_viewport(Some(ViewportSize {
        width: 1024,
        height: 800,
    }))
}

fn records(prefix: &str, n: usize) -> Vec<AnimalRecord> {
    (0..n)
        .map(|i| AnimalRecord::new(format!("{prefix}-{i}")))
        .collect()
}

#[test]
fn decode_page_accepts_array_items() {
    let json = br#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL SERVICE."},
        "body":{"items":{"item":[
            {"desertionNo":"448567202400123","upKindCd":"417000","kindCd":"Jindo","age":"2023(Year)",
             "sexCd":"F","happenDt":"20240301","happenPlace":"Mapo-gu","popfile1":"http://img/1.jpg",
             "popfile2":"","careNm":"Seoul Shelter","careRegNo":"311322200900001","processState":"protect"},
            {"desertionNo":448567202400124,"sexCd":"Q"}
        ]},"numOfRows":30,"pageNo":1,"totalCount":2}}}"#;

    let items = decode_page(json).unwrap();
    assert_eq!(items.len(), 2);

    let first = &items[0];
    assert_eq!(first.id(), "448567202400123");
    assert_eq!(first.species_code.as_deref(), Some("417000"));
    assert_eq!(first.sex, Some(Sex::Female));
    assert_eq!(first.images, vec!["http://img/1.jpg".to_owned()]);
    assert_eq!(first.shelter_name.as_deref(), Some("Seoul Shelter"));

    assert_eq!(items[1].id(), "448567202400124");
    assert_eq!(items[1].sex, Some(Sex::Unknown));
    assert!(items[1].images.is_empty());
}

#[test]
fn decode_page_treats_single_object_as_one_record() {
    let json = br#"{"response":{"header":{"resultCode":"00"},
        "body":{"items":{"item":{"desertionNo":"1","sexCd":"M"}},"totalCount":1}}}"#;
    let items = decode_page(json).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].sex, Some(Sex::Male));
}

#[test]
fn decode_page_treats_blank_items_as_empty_page() {
    for json in [
        &br#"{"response":{"header":{"resultCode":"00"},"body":{"items":"","totalCount":0}}}"#[..],
        &br#"{"response":{"header":{"resultCode":"00"},"body":{"items":{},"totalCount":0}}}"#[..],
        &br#"{"response":{"header":{"resultCode":"00"},"body":{"totalCount":0}}}"#[..],
    ] {
        assert!(decode_page(json).unwrap().is_empty());
    }
}

#[test]
fn decode_page_reports_errors() {
    let refused = br#"{"response":{"header":{"resultCode":"30","resultMsg":"SERVICE KEY IS NOT REGISTERED ERROR."}}}"#;
    assert!(matches!(decode_page(refused), Err(FetchError::Transport(_))));

    assert!(matches!(
        decode_page(b"<OpenAPI_ServiceResponse>"),
        Err(FetchError::Malformed(_))
    ));
    assert!(matches!(
        decode_page(br#"{"response":{"header":{"resultCode":"00"}}}"#),
        Err(FetchError::Malformed(_))
    ));
    assert!(matches!(
        decode_page(br#"{"response":{"header":{"resultCode":"00"},"body":{"items":"unavailable"}}}"#),
        Err(FetchError::Malformed(_))
    ));
    // Record without an identifier.
    assert!(matches!(
        decode_page(br#"{"response":{"header":{"resultCode":"00"},"body":{"items":{"item":[{"age":"1"}]}}}}"#),
        Err(FetchError::Malformed(_))
    ));
}

#[test]
fn query_pairs_omit_unset_fields() {
    let req = PageRequest {
        page_no: 1,
        page_size: 30,
        filter: FilterCriteria::default(),
    };
    assert_eq!(
        req.query_pairs(),
        vec![
            ("pageNo", "1".to_owned()),
            ("numOfRows", "30".to_owned()),
            ("_type", "json".to_owned()),
        ]
    );

    let req = PageRequest {
        page_no: 3,
        page_size: 30,
        filter: FilterCriteria::default()
            .with_sex(Some(Sex::Male))
            .with_status(Some(ProcessStatus::Notice))
            .with_species(Some("417000"))
            .with_region(Some("6110000"))
            .with_date_range(NaiveDate::from_ymd_opt(2024, 3, 1), NaiveDate::from_ymd_opt(2024, 3, 31))
            .with_query("  jindo "),
    };
    let pairs = req.query_pairs();
    for expected in [
        ("pageNo", "3"),
        ("sex_cd", "M"),
        ("state", "notice"),
        ("upkind", "417000"),
        ("upr_cd", "6110000"),
        ("bgnde", "20240301"),
        ("endde", "20240331"),
        ("q", "jindo"),
    ] {
        assert!(
            pairs.iter().any(|(k, v)| *k == expected.0 && v == expected.1),
            "missing {expected:?}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn session_pages_then_stops_on_short_page() {
    let (source, mut requests) = scripted();
    let mut handle = Session::spawn(desktop_options(), source);

    let first = requests.recv().await.unwrap();
    assert_eq!(first.request.page_no, 1);
    assert_eq!(first.request.page_size, 30);
    first.reply.send(Ok(records("p1", 30))).unwrap();
    let view = handle.wait_for(|v| v.len() == 30).await.unwrap();
    assert!(view.has_more);

    handle.on_scroll(3_200).unwrap();
    let second = requests.recv().await.unwrap();
    assert_eq!(second.request.page_no, 2);
    handle.wait_for(|v| v.is_loading_more()).await.unwrap();

    // Further near-end scrolls while loading are ignored.
    handle.on_scroll(3_300).unwrap();
    handle.on_scroll(3_400).unwrap();

    second.reply.send(Ok(records("p2", 12))).unwrap();
    let view = handle
        .wait_for(|v| v.len() == 42 && !v.is_loading_more())
        .await
        .unwrap();
    assert!(!view.has_more);

    handle.on_scroll(5_000).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(requests.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn session_discards_stale_append_after_region_change() {
    let (source, mut requests) = scripted();
    let mut handle = Session::spawn(desktop_options(), source);

    let first = requests.recv().await.unwrap();
    first.reply.send(Ok(records("p1", 30))).unwrap();
    handle.wait_for(|v| v.len() == 30).await.unwrap();

    handle.on_scroll(3_200).unwrap();
    let append = requests.recv().await.unwrap();
    assert_eq!(append.request.page_no, 2);

    let region = FilterCriteria::default().with_region(Some("6110000"));
    handle.set_filter(region).unwrap();
    let reset = requests.recv().await.unwrap();
    assert_eq!(reset.request.page_no, 1);
    assert_eq!(reset.request.filter.region.as_deref(), Some("6110000"));
    handle
        .wait_for(|v| v.is_loading_initial() && v.is_empty())
        .await
        .unwrap();

    append.reply.send(Ok(records("stale", 30))).unwrap();
    reset.reply.send(Ok(records("seoul", 7))).unwrap();

    let view = handle
        .wait_for(|v| !v.is_loading_initial() && v.len() == 7)
        .await
        .unwrap();
    assert!(view.items.iter().all(|r| r.id().starts_with("seoul")));
    assert!(!view.has_more);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let view = handle.view();
    assert_eq!(view.len(), 7);
    assert!(view.items.iter().all(|r| r.id().starts_with("seoul")));
}

#[tokio::test(start_paused = true)]
async fn session_debounces_search_edits() {
    let (source, mut requests) = scripted();
    let mut handle = Session::spawn(desktop_options(), source);

    let first = requests.recv().await.unwrap();
    first.reply.send(Ok(records("p1", 30))).unwrap();
    handle.wait_for(|v| v.len() == 30).await.unwrap();

    for query in ["j", "ji", "jin"] {
        handle
            .set_filter(FilterCriteria::default().with_query(query))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    // Still within the quiet period of the last edit.
    assert!(requests.try_recv().is_err());
    assert_eq!(handle.view().len(), 30);

    let search = requests.recv().await.unwrap();
    assert_eq!(search.request.filter.query, "jin");
    search.reply.send(Ok(records("jindo", 3))).unwrap();
    handle
        .wait_for(|v| v.len() == 3 && !v.is_loading_initial())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(requests.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn session_failure_stops_paging_until_refresh() {
    let (source, mut requests) = scripted();
    let mut handle = Session::spawn(desktop_options(), source);

    let first = requests.recv().await.unwrap();
    first
        .reply
        .send(Err(FetchError::transport("connection refused")))
        .unwrap();
    let view = handle
        .wait_for(|v| !v.is_loading_initial() && v.generation == 1)
        .await
        .unwrap();
    assert!(view.is_empty());
    assert!(!view.has_more);

    handle.refresh().unwrap();
    let retry = requests.recv().await.unwrap();
    assert_eq!(retry.request.page_no, 1);
    retry.reply.send(Ok(records("p1", 30))).unwrap();
    let view = handle.wait_for(|v| v.len() == 30).await.unwrap();
    assert!(view.has_more);
}

#[tokio::test(start_paused = true)]
async fn session_ends_when_handles_drop() {
    let (source, mut requests) = scripted();
    let handle = Session::spawn(desktop_options(), source);
    let first = requests.recv().await.unwrap();
    drop(handle);

    // The session task exits and drops its in-flight fetch along with the source.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(first.reply.is_closed());
    assert!(requests.recv().await.is_none());
}

/// Serves one canned response per connection and reports each request line.
#[cfg(feature = "http")]
async fn serve(
    responses: Vec<(&'static str, &'static str)>,
) -> (String, mpsc::UnboundedReceiver<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/list", listener.local_addr().unwrap());
    let (lines_tx, lines_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let head = String::from_utf8_lossy(&head);
            let line = head.lines().next().unwrap_or_default().to_owned();
            let _ = lines_tx.send(line);

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (base_url, lines_rx)
}

#[cfg(feature = "http")]
#[tokio::test]
async fn http_source_sends_query_and_maps_status() {
    let (base_url, mut lines) = serve(vec![
        ("500 Internal Server Error", "boom"),
        (
            "200 OK",
            r#"{"response":{"header":{"resultCode":"00"},"body":{"items":{"item":{"desertionNo":"1"}},"totalCount":1}}}"#,
        ),
    ])
    .await;
    let source = HttpListSource::new(HttpSourceConfig::new(base_url, "K")).unwrap();
    let request = PageRequest {
        page_no: 2,
        page_size: 30,
        filter: FilterCriteria::default(),
    };

    match source.fetch_page(&request).await {
        Err(FetchError::Transport(msg)) => {
            assert!(msg.contains("500"), "{msg}");
            assert!(msg.contains("boom"), "{msg}");
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
    assert_eq!(
        lines.recv().await.unwrap(),
        "GET /list?pageNo=2&numOfRows=30&_type=json&serviceKey=K HTTP/1.1"
    );

    let items = source.fetch_page(&request).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id(), "1");
    assert!(lines.recv().await.unwrap().starts_with("GET /list?pageNo=2&"));
}

#[cfg(feature = "http")]
#[tokio::test]
async fn http_source_maps_connection_failure_to_transport() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpListSource::new(
        HttpSourceConfig::new(format!("http://{addr}/list"), "K")
            .with_timeout(Some(Duration::from_secs(5))),
    )
    .unwrap();
    let request = PageRequest {
        page_no: 1,
        page_size: 30,
        filter: FilterCriteria::default(),
    };
    assert!(matches!(
        source.fetch_page(&request).await,
        Err(FetchError::Transport(_))
    ));
}
