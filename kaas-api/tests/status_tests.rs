//! Status Aggregation Tests
//! Composite workload status from controller objects and their pods

mod common;

use common::{deployment, pod, stateful_set, FakeCluster, NAMESPACE};
use kaas_api::status::{status_of, status_of_all, StatusLookup};
use kaas_common::PodPhase;

#[tokio::test]
async fn test_status_of_deployment_with_pods() {
    let cluster = FakeCluster::new()
        .with_deployment(deployment("web", Some(2), Some(1)))
        .with_pod(pod("web-1", "web", "Running"))
        .with_pod(pod("web-2", "web", "Pending"))
        .with_pod(pod("api-1", "api", "Running"));

    let StatusLookup::Found(status) = status_of(&cluster, NAMESPACE, "web").await.unwrap() else {
        panic!("expected web to be found");
    };

    assert_eq!(status.workload_name, "web");
    assert_eq!(status.desired_replicas, 2);
    assert_eq!(status.ready_replicas, 1);
    assert_eq!(status.instances.len(), 2);
    assert_eq!(status.instances[0].name, "web-1");
    assert_eq!(status.instances[0].phase, PodPhase::Running);
    assert_eq!(status.instances[1].phase, PodPhase::Pending);
    assert_eq!(status.instances[0].start_time, None);
}

#[tokio::test]
async fn test_status_defaults_when_counts_missing() {
    let cluster = FakeCluster::new().with_deployment(deployment("web", None, None));

    let StatusLookup::Found(status) = status_of(&cluster, NAMESPACE, "web").await.unwrap() else {
        panic!("expected web to be found");
    };

    assert_eq!(status.desired_replicas, 1);
    assert_eq!(status.ready_replicas, 0);
    assert!(status.instances.is_empty());
}

#[tokio::test]
async fn test_status_falls_back_to_stateful_set() {
    let cluster = FakeCluster::new()
        .with_stateful_set(stateful_set("orders", 1, 1))
        .with_pod(pod("orders-0", "orders", "Running"));

    let StatusLookup::Found(status) = status_of(&cluster, NAMESPACE, "orders").await.unwrap() else {
        panic!("expected orders to be found");
    };

    assert_eq!(status.workload_name, "orders");
    assert_eq!(status.ready_replicas, 1);
    assert_eq!(status.instances.len(), 1);
}

#[tokio::test]
async fn test_status_not_found() {
    let cluster = FakeCluster::new();

    let lookup = status_of(&cluster, NAMESPACE, "ghost").await.unwrap();
    assert_eq!(
        lookup,
        StatusLookup::NotFound {
            namespace: NAMESPACE.to_string(),
            name: "ghost".to_string(),
        }
    );

    let body = serde_json::to_value(StatusLookup::not_found_message(NAMESPACE, "ghost")).unwrap();
    assert_eq!(body["error"], "Deployment ghost not found in namespace apps");
}

#[tokio::test]
async fn test_status_in_other_namespace_is_not_found() {
    let cluster = FakeCluster::new().with_deployment(deployment("web", Some(1), Some(1)));

    let lookup = status_of(&cluster, "other", "web").await.unwrap();
    assert!(matches!(lookup, StatusLookup::NotFound { .. }));
}

#[tokio::test]
async fn test_status_read_failure_propagates() {
    let cluster = FakeCluster::unreachable();
    assert!(status_of(&cluster, NAMESPACE, "web").await.is_err());
}

#[tokio::test]
async fn test_status_of_all_lists_deployments_then_stateful_sets() {
    let cluster = FakeCluster::new()
        .with_stateful_set(stateful_set("orders", 1, 0))
        .with_deployment(deployment("web", Some(2), Some(2)))
        .with_deployment(deployment("api", Some(1), Some(1)))
        .with_pod(pod("web-1", "web", "Running"))
        .with_pod(pod("web-2", "web", "Running"));

    let statuses = status_of_all(&cluster, NAMESPACE).await.unwrap();

    let names: Vec<&str> = statuses.iter().map(|s| s.workload_name.as_str()).collect();
    assert_eq!(names, vec!["web", "api", "orders"]);
    assert_eq!(statuses[0].instances.len(), 2);
    assert!(statuses[1].instances.is_empty());
    assert_eq!(statuses[2].desired_replicas, 1);
}

#[tokio::test]
async fn test_status_of_all_empty_namespace() {
    let cluster = FakeCluster::new();
    assert!(status_of_all(&cluster, "empty").await.unwrap().is_empty());
}
