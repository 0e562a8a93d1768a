// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use pcsign_planetary_computer::TokenProvider;
use pretty_assertions::assert_eq;

use super::*;

#[tokio::test]
async fn test_get_token_uses_cache() {
    let mock = MockService::new();
    let signer = mock.signer();

    let first = signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();
    let second = signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.token_requests().len(), 1);

    let key = token_request_url(ACCOUNT_NAME, CONTAINER_NAME);
    let cached = signer.token_provider().cache().get(&key).await.unwrap();
    assert_eq!(cached, first);
}

#[tokio::test]
async fn test_tokens_are_cached_per_container() {
    let mock = MockService::new();
    let signer = mock.signer();

    signer.sign_url(&blob_url("01.tif")).await.unwrap();
    signer.sign_url(&blob_url("02.tif")).await.unwrap();
    signer
        .sign_url("https://naipeuwest.blob.core.windows.net/other/01.tif")
        .await
        .unwrap();

    assert_eq!(
        mock.token_requests(),
        vec![
            token_request_url(ACCOUNT_NAME, CONTAINER_NAME),
            token_request_url(ACCOUNT_NAME, "other"),
        ]
    );
    assert_eq!(signer.token_provider().cache().len(), 2);
}

#[tokio::test]
async fn test_expiring_token_is_refreshed() {
    let mock = MockService::new();
    let signer = mock.signer();

    // Inside the one minute buffer: every use goes back to the service.
    mock.expire_in(TimeDelta::seconds(30));
    signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();
    mock.expire_in(TimeDelta::hours(1));
    let refreshed = signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();
    assert_eq!(mock.token_requests().len(), 2);

    let cached = signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();
    assert_eq!(mock.token_requests().len(), 2);
    assert_eq!(cached, refreshed);
    assert!(cached.ttl() > 60);
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let mock = MockService::new();
    let signer = mock.signer();

    mock.expire_in(TimeDelta::minutes(-5));
    let expired = signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();
    assert!(expired.ttl() < 0);

    mock.expire_in(TimeDelta::hours(1));
    let fresh = signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();

    assert!(fresh.expiry > expired.expiry);
    assert_eq!(mock.token_requests().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_fetch() {
    let mock = MockService::slow(Duration::from_millis(100));
    let signer = mock.signer();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let signer = signer.clone();
            tokio::spawn(async move { signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await })
        })
        .collect();

    let mut tokens = Vec::new();
    for task in tasks {
        tokens.push(task.await.unwrap().unwrap());
    }

    assert!(tokens.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(mock.token_requests().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_containers_do_not_wait_on_each_other() {
    let mock = MockService::slow(Duration::from_millis(200));
    let signer = mock.signer();

    let started = std::time::Instant::now();
    let (a, b) = tokio::join!(
        signer.get_token(ACCOUNT_NAME, "a"),
        signer.get_token(ACCOUNT_NAME, "b"),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(mock.token_requests().len(), 2);
    assert!(started.elapsed() < Duration::from_millis(390));
}

#[tokio::test]
async fn test_subscription_key_is_sent() {
    let mock = MockService::new();
    let signer = Signer::new(
        mock.context(),
        Config::default().with_subscription_key("my-key"),
    );

    signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].subscription_key.as_deref(), Some("my-key"));
}

#[tokio::test]
async fn test_no_subscription_key_by_default() {
    let mock = MockService::new();

    mock.signer()
        .get_token(ACCOUNT_NAME, CONTAINER_NAME)
        .await
        .unwrap();

    assert_eq!(mock.requests()[0].subscription_key, None);
}

#[tokio::test]
async fn test_set_subscription_key_applies_to_later_requests() {
    let mock = MockService::new();
    let signer = mock.signer();

    signer.get_token(ACCOUNT_NAME, "a").await.unwrap();
    signer.token_provider().set_subscription_key("later");
    signer.get_token(ACCOUNT_NAME, "b").await.unwrap();

    let keys: Vec<_> = mock
        .requests()
        .into_iter()
        .map(|r| r.subscription_key)
        .collect();
    assert_eq!(keys, vec![None, Some("later".to_string())]);
}

#[tokio::test]
async fn test_custom_sas_url() {
    let mock = MockService::new();
    let signer = Signer::new(
        mock.context(),
        Config::default().with_sas_url("https://sas.example.com/api/token/"),
    );

    signer.sign_url(&blob_url("01.tif")).await.unwrap();

    assert_eq!(
        mock.token_requests(),
        vec!["https://sas.example.com/api/token/naipeuwest/naip".to_string()]
    );
}

#[tokio::test]
async fn test_signers_share_a_token_provider() {
    let mock = MockService::new();
    let tokens = TokenProvider::new(Config::default());
    let first = Signer::with_token_provider(mock.context(), tokens.clone());
    let second = Signer::with_token_provider(mock.context(), tokens);

    first.sign_url(&blob_url("01.tif")).await.unwrap();
    second.sign_url(&blob_url("02.tif")).await.unwrap();

    assert_eq!(mock.token_requests().len(), 1);
}
