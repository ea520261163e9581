use reqwest::Client;

use crate::api::types::{
    Area, CalendarResponse, ExportFormat, Note, NoteDraft, NoteQuery, NotesPage, SearchRequest,
    SearchResponse, Statistics, Tag, UploadResponse,
};
use crate::error::{NoteError, Result};

#[derive(Clone)]
pub struct NotesClient {
    client: Client,
    base_url: String,
}

impl NotesClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[cfg(test)]
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self::new(base_url)
    }

    async fn ok(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let detail = resp.text().await.unwrap_or_default();
        Err(NoteError::Api { status, detail })
    }

    pub async fn list_notes(&self, query: &NoteQuery) -> Result<NotesPage> {
        let resp = self
            .client
            .get(format!("{}/api/notes", self.base_url))
            .query(&query.to_params())
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<NotesPage>().await?)
    }

    pub async fn get_note(&self, id: i64) -> Result<Note> {
        let resp = self
            .client
            .get(format!("{}/api/notes/{}", self.base_url, id))
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<Note>().await?)
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> Result<Note> {
        let resp = self
            .client
            .post(format!("{}/api/notes", self.base_url))
            .json(draft)
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<Note>().await?)
    }

    pub async fn update_note(&self, id: i64, draft: &NoteDraft) -> Result<Note> {
        let resp = self
            .client
            .put(format!("{}/api/notes/{}", self.base_url, id))
            .json(draft)
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<Note>().await?)
    }

    pub async fn delete_note(&self, id: i64) -> Result<()> {
        let resp = self
            .client
            .delete(format!("{}/api/notes/{}", self.base_url, id))
            .send()
            .await?;
        Self::ok(resp).await?;
        Ok(())
    }

    pub async fn list_areas(&self) -> Result<Vec<Area>> {
        let resp = self
            .client
            .get(format!("{}/api/areas", self.base_url))
            .send()
            .await?;
        let value = Self::ok(resp).await?.json::<serde_json::Value>().await?;
        Ok(crate::api::types::unwrap_list(value, "areas"))
    }

    pub async fn create_area(&self, area: &Area) -> Result<Area> {
        let resp = self
            .client
            .post(format!("{}/api/areas", self.base_url))
            .json(area)
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<Area>().await?)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;
        let value = Self::ok(resp).await?.json::<serde_json::Value>().await?;
        Ok(crate::api::types::unwrap_list(value, "tags"))
    }

    pub async fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        let resp = self
            .client
            .post(format!("{}/api/tags", self.base_url))
            .json(tag)
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<Tag>().await?)
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        let resp = self
            .client
            .get(format!("{}/api/statistics", self.base_url))
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<Statistics>().await?)
    }

    pub async fn calendar(&self, year: i32, month: u32) -> Result<CalendarResponse> {
        let resp = self
            .client
            .get(format!("{}/api/calendar", self.base_url))
            .query(&[("year", year.to_string()), ("month", month.to_string())])
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<CalendarResponse>().await?)
    }

    pub async fn search(&self, req: &SearchRequest) -> Result<SearchResponse> {
        let resp = self
            .client
            .post(format!("{}/api/search", self.base_url))
            .json(req)
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<SearchResponse>().await?)
    }

    /// Fetches the note body rendered by the server in the requested format.
    pub async fn export_note(&self, id: i64, format: ExportFormat) -> Result<String> {
        let resp = self
            .client
            .get(format!("{}/api/notes/{}/export", self.base_url, id))
            .query(&[("format", format.as_str())])
            .send()
            .await?;
        Ok(Self::ok(resp).await?.text().await?)
    }

    pub async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .client
            .post(format!("{}/api/upload-image", self.base_url))
            .multipart(form)
            .send()
            .await?;
        Ok(Self::ok(resp).await?.json::<UploadResponse>().await?)
    }
}
