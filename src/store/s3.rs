//! S3-compatible backend built on `aws-sdk-s3`.
//!
//! The SDK is async. The pipeline is not: `S3Store` owns a current-thread
//! tokio runtime and blocks on each request, so callers see plain blocking
//! calls and requests never overlap.

use super::client::{ListPage, ObjectStore, ObjectSummary, StoreError};
use crate::config::StoreConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{IndexDocument, WebsiteConfiguration};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Provider name attached to statically configured credentials.
const CREDENTIALS_PROVIDER: &str = "album-site-config";

pub struct S3Store {
    client: Client,
    bucket: String,
    runtime: Runtime,
}

impl S3Store {
    /// Connect to the bucket described by `config`.
    ///
    /// Credentials come from the config when both keys are set, otherwise from
    /// the SDK's default provider chain (environment, profile, instance role).
    /// Nothing is written to shared AWS config files.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(config.region.clone()))
                .load(),
        );

        let mut builder = S3ConfigBuilder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            builder = builder.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        let client = Client::from_conf(builder.build());

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            "S3 store initialized"
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            runtime,
        })
    }
}

fn transfer_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::Transfer(DisplayErrorContext(err).to_string())
}

impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn list_page(
        &self,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix(prefix.map(str::to_string))
            .set_continuation_token(continuation.map(str::to_string));

        let response = self.runtime.block_on(request.send()).map_err(|err| {
            if err
                .as_service_error()
                .is_some_and(|e| e.is_no_such_bucket())
            {
                StoreError::NoSuchBucket(self.bucket.clone())
            } else {
                transfer_error(err)
            }
        })?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                })
            })
            .collect();

        // Some S3-compatible servers omit `IsTruncated`; the token is authoritative.
        let next_continuation = response.next_continuation_token().map(str::to_string);

        Ok(ListPage {
            objects,
            next_continuation,
        })
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        debug!(bucket = %self.bucket, key, "get object");
        let response = self
            .runtime
            .block_on(
                self.client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .send(),
            )
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    StoreError::NotFound(key.to_string())
                } else {
                    transfer_error(err)
                }
            })?;

        let body = self
            .runtime
            .block_on(response.body.collect())
            .map_err(|e| StoreError::Transfer(format!("reading {key}: {e}")))?;
        Ok(body.into_bytes().to_vec())
    }

    fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key, size = body.len(), "put object");
        self.runtime
            .block_on(
                self.client
                    .put_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .content_type(content_type)
                    .body(ByteStream::from(body))
                    .send(),
            )
            .map_err(transfer_error)?;
        Ok(())
    }

    fn set_website_config(&self, index_document: &str) -> Result<(), StoreError> {
        let index = IndexDocument::builder()
            .suffix(index_document)
            .build()
            .map_err(|e| StoreError::Transfer(e.to_string()))?;
        let website = WebsiteConfiguration::builder().index_document(index).build();

        self.runtime
            .block_on(
                self.client
                    .put_bucket_website()
                    .bucket(&self.bucket)
                    .website_configuration(website)
                    .send(),
            )
            .map_err(transfer_error)?;
        Ok(())
    }
}
