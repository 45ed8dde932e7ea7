use std::path::Path;

use thiserror::Error;

use crate::constants::*;
use crate::filter::Filter;
use crate::manager::{
    Change, CommitError, Entity, EntityManager, FieldRule, RuleContext, ValidationErrors,
};
use crate::models::{AdminPresentResponse, Id};
use crate::utils::{validate_range, validate_required};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Heic,
    Heif,
    Webp,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/heic" => Some(ImageFormat::Heic),
            "image/heif" => Some(ImageFormat::Heif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "heic" => Some(ImageFormat::Heic),
            "heif" => Some(ImageFormat::Heif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Heic => "image/heic",
            ImageFormat::Heif => "image/heif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image type: {0}")]
    Unsupported(String),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// An image picked for upload, not yet stored on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(
        file_name: impl Into<String>,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let format =
            ImageFormat::from_mime(mime).ok_or_else(|| ImageError::Unsupported(mime.to_string()))?;
        Ok(ImageData {
            file_name: file_name.into(),
            format,
            bytes,
        })
    }

    /// Reads an image file, inferring the format from its extension.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .ok_or_else(|| ImageError::Unsupported(path.display().to_string()))?;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ImageData {
            file_name,
            format,
            bytes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Photo {
    /// Already stored by the backend under this photo id.
    Remote(Id),
    Local(ImageData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gift {
    pub id: Id,
    pub name: String,
    pub price: u32,
    pub stock: u32,
    pub photos: Vec<Photo>,
}

impl Gift {
    /// Gifts are grouped under their own name.
    pub fn category(&self) -> &str {
        &self.name
    }

    pub fn from_present(present: AdminPresentResponse) -> Gift {
        Gift {
            id: present.id,
            name: present.name,
            price: present.price_coins,
            stock: present.stock,
            photos: present
                .photos
                .into_iter()
                .map(|photo| Photo::Remote(photo.id))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiftForm {
    pub name: String,
    pub price: u32,
    pub stock: u32,
    pub photos: Vec<Photo>,
}

impl GiftForm {
    pub fn add_image(&mut self, image: ImageData) -> Result<(), &'static str> {
        if self.photos.len() >= MAX_GIFT_IMAGES {
            return Err(ERR_TOO_MANY_IMAGES);
        }
        self.photos.push(Photo::Local(image));
        Ok(())
    }

    /// Adds raw upload bytes after checking the declared MIME type.
    pub fn add_upload(
        &mut self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<(), &'static str> {
        let image = ImageData::new(file_name, mime, bytes).map_err(|_| ERR_UNSUPPORTED_IMAGE)?;
        self.add_image(image)
    }

    pub fn remove_image(&mut self, index: usize) -> Option<Photo> {
        if index < self.photos.len() {
            Some(self.photos.remove(index))
        } else {
            None
        }
    }
}

fn check_name(form: &GiftForm, _ctx: &RuleContext<'_, Gift>) -> Result<(), String> {
    validate_required(&form.name, "Name")
}

fn check_price(form: &GiftForm, _ctx: &RuleContext<'_, Gift>) -> Result<(), String> {
    validate_range(form.price, MIN_GIFT_PRICE, MAX_GIFT_PRICE, "Price")
}

fn check_stock(form: &GiftForm, _ctx: &RuleContext<'_, Gift>) -> Result<(), String> {
    validate_range(form.stock, MIN_GIFT_STOCK, MAX_GIFT_STOCK, "Stock")
}

fn check_images(form: &GiftForm, _ctx: &RuleContext<'_, Gift>) -> Result<(), String> {
    if form.photos.is_empty() {
        return Err("Upload at least one image".to_string());
    }
    if form.photos.len() > MAX_GIFT_IMAGES {
        return Err(ERR_TOO_MANY_IMAGES.to_string());
    }
    Ok(())
}

static GIFT_RULES: [FieldRule<Gift>; 4] = [
    FieldRule { field: "name", check: check_name },
    FieldRule { field: "price", check: check_price },
    FieldRule { field: "stock", check: check_stock },
    FieldRule { field: "images", check: check_images },
];

impl Entity for Gift {
    const KIND: &'static str = "gift";
    type Form = GiftForm;
    type Filter = GiftFilter;

    fn id(&self) -> Id {
        self.id
    }

    fn rules() -> &'static [FieldRule<Self>] {
        &GIFT_RULES
    }

    fn to_form(&self) -> GiftForm {
        GiftForm {
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
            photos: self.photos.clone(),
        }
    }

    fn create(id: Id, form: GiftForm) -> Self {
        Gift {
            id,
            name: form.name.trim().to_string(),
            price: form.price,
            stock: form.stock,
            photos: form.photos,
        }
    }

    fn apply(&mut self, form: GiftForm) {
        self.name = form.name.trim().to_string();
        self.price = form.price;
        self.stock = form.stock;
        self.photos = form.photos;
    }
}

/// Shows one category, or every gift when none is chosen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiftFilter {
    pub category: Option<String>,
}

impl Filter<Gift> for GiftFilter {
    fn matches(&self, gift: &Gift) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| gift.category() == category)
    }
}

impl EntityManager<Gift> {
    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for gift in self.items() {
            if !categories.contains(&gift.category()) {
                categories.push(gift.category());
            }
        }
        categories
    }

    /// Sets the stock level directly. Zero is allowed here so a sold-out
    /// gift can stay listed.
    pub fn set_stock(&mut self, id: Id, stock: u32) -> Result<Change, CommitError> {
        if stock > MAX_GIFT_STOCK {
            let mut errors = ValidationErrors::default();
            errors.insert(
                "stock",
                format!("Stock must be between 0 and {}", MAX_GIFT_STOCK),
            );
            return Err(CommitError::Invalid(errors));
        }
        self.modify(id, |gift| gift.stock = stock)
    }
}
