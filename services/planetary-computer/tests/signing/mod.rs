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

use pcsign_core::ErrorKind;
use pcsign_planetary_computer::{Asset, ItemCollection, Signable};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

use super::*;

#[test_case("https://planetarycomputer.microsoft.com/api/stac/v1"; "api url")]
#[test_case("https://example.com/naip/01.tif"; "other host")]
#[test_case("abfs://naip/01.tif"; "adlfs url")]
#[test_case("not a url at all"; "free text")]
#[test_case(""; "empty")]
#[tokio::test]
async fn test_sign_url_outside_blob_storage(url: &str) {
    let mock = MockService::new();

    let signed = mock.signer().sign_url(url).await.unwrap();

    assert_eq!(signed, url);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_url_already_signed() {
    let mock = MockService::new();
    let url = format!("{}?st=2021-01-01&se=2021-01-02&sp=rl&sig=abc", blob_url("01.tif"));

    let signed = mock.signer().sign_url(&url).await.unwrap();

    assert_eq!(signed, url);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_url() {
    let mock = MockService::new();
    let url = blob_url("01.tif");

    let signed = mock.signer().sign_url(&url).await.unwrap();

    assert!(signed.starts_with(&format!("{url}?")));
    assert!(signed.ends_with("sig=naipeuwest-naip"));
    assert_signed(&signed);
    assert_eq!(
        mock.token_requests(),
        vec![token_request_url(ACCOUNT_NAME, CONTAINER_NAME)]
    );
}

#[tokio::test]
async fn test_sign_url_is_idempotent() {
    let mock = MockService::new();
    let signer = mock.signer();

    let once = signer.sign_url(&blob_url("01.tif")).await.unwrap();
    let twice = signer.sign_url(&once).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(mock.token_requests().len(), 1);
}

#[tokio::test]
async fn test_sign_url_without_container() {
    let mock = MockService::new();

    let err = mock
        .signer()
        .sign_url("https://naipeuwest.blob.core.windows.net/")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UrlInvalid);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_url_link() {
    let mock = MockService::new();
    let signer = mock.signer();

    let link = signer.sign_url_link(&blob_url("01.tif")).await.unwrap().unwrap();
    let token = signer.get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();

    assert_eq!(link.href, format!("{}?{}", blob_url("01.tif"), token.token));
    assert_eq!(link.expiry, token.expiry);
    assert!(signer
        .sign_url_link("https://example.com/01.tif")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_token_request_failure_propagates() {
    let mock = MockService::failing(403);

    let err = mock.signer().sign_url(&blob_url("01.tif")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TokenRequestFailed);
    assert!(err.to_string().contains("403"), "{err}");
}

#[tokio::test]
async fn test_sign_asset() {
    let mock = MockService::new();
    let asset = Asset::new(blob_url("01.tif")).with_extra_field("gsd", json!(0.6));

    let signed = mock.signer().sign_asset(&asset).await.unwrap();

    assert_signed(&signed.href);
    assert_eq!(signed.extra_fields, asset.extra_fields);
    assert_eq!(asset.href, blob_url("01.tif"));
}

#[tokio::test]
async fn test_sign_item() {
    let mock = MockService::new();
    let unsigned = item(sample_item());

    let signed = mock.signer().sign_item(&unsigned).await.unwrap();

    for key in ["image", "metadata", "thumbnail"] {
        assert_signed(&signed.asset(key).unwrap().href);
        assert_eq!(unsigned.asset(key).unwrap().href, sample_item()["assets"][key]["href"]);
    }
    assert_eq!(
        signed.asset("rendered_preview").unwrap().href,
        unsigned.asset("rendered_preview").unwrap().href
    );
    for asset in signed.assets().values() {
        assert_eq!(asset.owner(), Some(signed.id()));
    }

    let keys = |item: &Item| item.assets().keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys(&signed), keys(&unsigned));
    assert_eq!(signed.id(), unsigned.id());
    assert_eq!(signed.extra_fields, unsigned.extra_fields);

    // All three assets share one container.
    assert_eq!(mock.token_requests().len(), 1);
}

#[tokio::test]
async fn test_sign_item_in_place() {
    let mock = MockService::new();
    let mut target = item(sample_item());

    mock.signer().sign_item_in_place(&mut target).await.unwrap();

    assert_signed(&target.asset("image").unwrap().href);
    assert_eq!(target.asset("image").unwrap().owner(), Some(target.id()));
}

#[tokio::test]
async fn test_sign_assets_is_deprecated_alias() {
    let mock = MockService::new();
    let unsigned = item(sample_item());
    let signer = mock.signer();

    #[allow(deprecated)]
    let signed = signer.sign_assets(&unsigned).await.unwrap();

    assert_eq!(signed, signer.sign_item(&unsigned).await.unwrap());
}

#[tokio::test]
async fn test_sign_item_collection() {
    let mock = MockService::new();
    let mut first = item(sample_item());
    first.set_id("first");
    let mut second = item(sample_item());
    second.set_id("second");
    let items: ItemCollection = vec![first, second, item(sample_zarr_item())]
        .into_iter()
        .collect();

    let signed = mock.signer().sign_item_collection(&items).await.unwrap();

    assert_eq!(signed.len(), items.len());
    for (input, output) in items.iter().zip(signed.iter()) {
        assert_eq!(output.id(), input.id());
        assert_eq!(
            output.assets().keys().collect::<Vec<_>>(),
            input.assets().keys().collect::<Vec<_>>()
        );
        assert_eq!(output.extra_fields, input.extra_fields);
    }
    for i in 0..2 {
        assert_signed(&signed.get(i).unwrap().asset("image").unwrap().href);
    }
    assert_signed(&signed.get(2).unwrap().asset("zarr-https").unwrap().href);
    assert_eq!(items.get(0).unwrap().asset("image").unwrap().href, blob_url("01.tif"));
}

#[tokio::test]
async fn test_sign_item_keeps_empty_and_null_fields() {
    let mock = MockService::new();
    let value = json!({
        "type": "Feature",
        "stac_version": "1.0.0",
        "id": "sparse",
        "collection": null,
        "geometry": null,
        "properties": {},
        "links": [],
        "assets": {
            "image": {"href": blob_url("01.tif"), "roles": [], "title": null}
        }
    });

    let signed = mock
        .signer()
        .sign_item(&item(value.clone()))
        .await
        .unwrap()
        .to_value()
        .unwrap();

    assert_signed(signed["assets"]["image"]["href"].as_str().unwrap());
    assert_eq!(signed["assets"]["image"]["roles"], json!([]));
    assert_eq!(signed["assets"]["image"]["title"], Value::Null);
    assert!(signed["assets"]["image"].as_object().unwrap().contains_key("title"));
    assert_eq!(signed["links"], json!([]));
    assert_eq!(signed["collection"], Value::Null);
    assert!(signed.as_object().unwrap().contains_key("collection"));
}

#[tokio::test]
async fn test_sign_adlfs_url_with_account_in_authority() {
    let mock = MockService::new();
    let unsigned = item(json!({
        "type": "Feature",
        "stac_version": "1.0.0",
        "id": "daymet-daily-hi",
        "geometry": null,
        "properties": {"datetime": null},
        "assets": {
            "zarr-abfs": {
                "href": "abfs://daymet-zarr@daymeteuwest.dfs.core.windows.net/daily/hi.zarr",
                "xarray:storage_options": {"account_name": "daymeteuwest"}
            }
        }
    }));

    let signed = mock.signer().sign_item(&unsigned).await.unwrap();

    let credential = signed.asset("zarr-abfs").unwrap().extra_fields["xarray:storage_options"]
        ["credential"]
        .as_str()
        .unwrap();
    assert!(credential.ends_with("sig=daymeteuwest-daymet-zarr"));
    assert_eq!(
        mock.token_requests(),
        vec![token_request_url("daymeteuwest", "daymet-zarr")]
    );
}

#[tokio::test]
async fn test_sign_empty_item_collection() {
    let mock = MockService::new();

    let signed = mock
        .signer()
        .sign_item_collection(&ItemCollection::default())
        .await
        .unwrap();

    assert!(signed.is_empty());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_zarr_item() {
    let mock = MockService::new();

    let signed = mock.signer().sign_item(&item(sample_zarr_item())).await.unwrap();

    let abfs = signed.asset("zarr-abfs").unwrap();
    assert_eq!(abfs.href, "abfs://daymet-zarr/daily/hi.zarr");
    let credential = abfs.extra_fields["xarray:storage_options"]["credential"]
        .as_str()
        .unwrap();
    assert!(credential.ends_with("sig=daymeteuwest-daymet-zarr"));
    assert_eq!(abfs.extra_fields["xarray:open_kwargs"], json!({"consolidated": true}));

    let https = signed.asset("zarr-https").unwrap();
    assert_signed(&https.href);
    assert!(https.extra_fields["xarray:open_kwargs"]
        .get("storage_options")
        .is_none());
}

#[tokio::test]
async fn test_sign_tabular_item() {
    let mock = MockService::new();

    let signed = mock.signer().sign_item(&item(sample_tabular_item())).await.unwrap();

    let options = &signed.asset("data").unwrap().extra_fields["table:storage_options"];
    assert_eq!(options["account_name"], "ai4edataeuwest");
    assert!(options["credential"]
        .as_str()
        .unwrap()
        .ends_with("sig=ai4edataeuwest-gbif"));
    assert_eq!(
        mock.token_requests(),
        vec![token_request_url("ai4edataeuwest", "gbif")]
    );
}

#[tokio::test]
async fn test_sign_nested_storage_options() {
    let mock = MockService::new();
    let asset = Asset::new("az://era5/monthly.zarr").with_extra_field(
        "xarray:open_kwargs",
        json!({"backend_kwargs": {"storage_options": {"account_name": "cpdataeuwest"}}}),
    );

    let signed = mock.signer().sign_asset(&asset).await.unwrap();

    let options = &signed.extra_fields["xarray:open_kwargs"]["backend_kwargs"]["storage_options"];
    assert!(options["credential"]
        .as_str()
        .unwrap()
        .ends_with("sig=cpdataeuwest-era5"));
}

#[tokio::test]
async fn test_storage_options_without_adlfs_href() {
    let mock = MockService::new();
    let asset = Asset::new("s3://bucket/data.parquet")
        .with_extra_field("table:storage_options", json!({"account_name": "foo"}));

    let signed = mock.signer().sign_asset(&asset).await.unwrap();

    assert_eq!(signed, asset);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_vrt() {
    let mock = MockService::new();
    let vrt = format!(
        concat!(
            "<VRTDataset rasterXSize=\"512\" rasterYSize=\"512\">\n",
            "  <Metadata><MDI key=\"source\">https://planetarycomputer.microsoft.com/api</MDI></Metadata>\n",
            "  <VRTRasterBand dataType=\"Byte\" band=\"1\">\n",
            "    <SimpleSource><SourceFilename relativeToVRT=\"0\">/vsicurl/{}</SourceFilename></SimpleSource>\n",
            "    <SimpleSource><SourceFilename relativeToVRT=\"0\">/vsicurl/{}</SourceFilename></SimpleSource>\n",
            "  </VRTRasterBand>\n",
            "</VRTDataset>"
        ),
        blob_url("01.tif"),
        "https://goes.blob.core.windows.net/noaa-goes16/ABI.nc",
    );

    let signed = mock.signer().sign_vrt(&vrt).await.unwrap();

    let naip_token = mock.signer().get_token(ACCOUNT_NAME, CONTAINER_NAME).await.unwrap();
    let expected = vrt
        .replace(
            &blob_url("01.tif"),
            &format!("{}?{}", blob_url("01.tif"), naip_token.token),
        )
        .replace(
            "noaa-goes16/ABI.nc",
            "noaa-goes16/ABI.nc?st=2021-01-01T00%3A00%3A00Z&se=2999-01-01T00%3A00%3A00Z&sp=rl&sv=2020-06-12&sr=c&sig=goes-noaa-goes16",
        );
    assert_eq!(signed, expected);
}

#[tokio::test]
async fn test_sign_vrt_without_urls() {
    let mock = MockService::new();
    let vrt = "<VRTDataset><Metadata>nothing here</Metadata></VRTDataset>";

    assert_eq!(mock.signer().sign_vrt(vrt).await.unwrap(), vrt);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_vrt_skips_container_without_path() {
    let mock = MockService::new();
    let vrt = "<VRTDataset><Foo>https://acct.blob.core.windows.net/cont</Foo></VRTDataset>";

    assert_eq!(mock.signer().sign_vrt(vrt).await.unwrap(), vrt);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_dispatch_keeps_shape() {
    let mock = MockService::new();
    let signer = mock.signer();
    let unsigned = item(sample_item());

    let signed = signer.sign(&Signable::from(blob_url("01.tif"))).await.unwrap();
    assert!(matches!(&signed, Signable::Url(url) if url.contains("se=")));

    let vrt = format!("<VRTDataset>{}</VRTDataset>", blob_url("01.tif"));
    let signed = signer.sign(&Signable::from(vrt.as_str())).await.unwrap();
    assert!(matches!(&signed, Signable::Vrt(s) if s.contains("se=")));

    let asset = unsigned.asset("image").unwrap().clone();
    let signed = signer.sign(&Signable::from(asset)).await.unwrap();
    assert!(matches!(&signed, Signable::Asset(a) if a.href.contains("se=")));

    let source = Signable::from(unsigned.clone());
    let signed = signer.sign(&source).await.unwrap();
    match (&source, &signed) {
        (Signable::Item(before), Signable::Item(after)) => {
            assert_eq!(before, &unsigned);
            assert_eq!(after, &signer.sign_item(&unsigned).await.unwrap());
        }
        other => panic!("unexpected shapes: {other:?}"),
    }

    let items: ItemCollection = vec![unsigned.clone()].into_iter().collect();
    let signed = signer.sign(&Signable::from(items)).await.unwrap();
    assert!(matches!(&signed, Signable::ItemCollection(items) if items.len() == 1));
}

#[tokio::test]
async fn test_sign_in_place_mutates() {
    let mock = MockService::new();
    let mut signable = Signable::from(item(sample_item()));

    mock.signer().sign_in_place(&mut signable).await.unwrap();

    let Signable::Item(signed) = signable else {
        panic!("item stays an item");
    };
    assert_signed(&signed.asset("image").unwrap().href);
}

#[test_case(json!(42); "number")]
#[test_case(json!(false); "bool")]
#[test_case(Value::Null; "null")]
#[test_case(json!([blob_url("01.tif")]); "array")]
#[tokio::test]
async fn test_sign_value_unsupported_type(value: Value) {
    let mock = MockService::new();

    let err = mock.signer().sign_value(&value).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_sign_value() {
    let mock = MockService::new();
    let signer = mock.signer();

    let signed = signer.sign_value(&json!(blob_url("01.tif"))).await.unwrap();
    assert_signed(signed.as_str().unwrap());

    let signed = signer.sign_value(&sample_item()).await.unwrap();
    assert_signed(signed["assets"]["image"]["href"].as_str().unwrap());
    assert_eq!(signed["properties"], sample_item()["properties"]);
}
