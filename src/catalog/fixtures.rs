//! In-memory catalog used for local development and tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::{CatalogError, CatalogSource, Category};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{Money, Weight};
use crate::store::Role;

#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    admins: Vec<String>,
}

impl FixtureCatalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self { Self { products, categories, admins: vec![] } }

    pub fn sample() -> Self { Self::new(sample_products(), sample_categories()) }

    /// Grants the admin role to these user ids.
    pub fn with_admins<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admins = ids.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl CatalogSource for FixtureCatalog {
    fn name(&self) -> &'static str { "fixture" }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> { Ok(self.products.clone()) }

    async fn product(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogError> { Ok(self.categories.clone()) }

    async fn role_for(&self, user_id: &str) -> Result<Role, CatalogError> {
        Ok(if self.admins.iter().any(|a| a == user_id) { Role::Admin } else { Role::Customer })
    }

    async fn ping(&self) -> Result<(), CatalogError> { Ok(()) }
}

pub fn sample_categories() -> Vec<Category> {
    vec![
        Category::new("phone", "Điện thoại", "Phones", "phone"),
        Category::new("laptop", "Laptop", "Laptops", "laptop"),
        Category::new("tablet", "Máy tính bảng", "Tablets", "tablet"),
        Category::new("audio", "Âm thanh", "Audio", "audio"),
        Category::new("watch", "Đồng hồ thông minh", "Smartwatches", "watch"),
        Category::new("accessory", "Phụ kiện", "Accessories", "accessory"),
    ]
}

pub fn sample_products() -> Vec<Product> {
    let now = Utc::now();
    vec![
        Product::create("ip15pm", "iPhone 15 Pro Max", Money::vnd(29_990_000))
            .with_original_price(Money::vnd(34_990_000)).with_category("phone").with_brand("Apple")
            .with_description("Khung titan, chip A17 Pro, camera 48MP").with_rating(4.8, 1250).with_sold(3200).with_stock(45)
            .with_tags(["5G", "flagship", "titan"]).with_spec("Màn hình", "6.7 inch").with_spec("RAM", "8GB")
            .with_image("/images/ip15pm.jpg").with_weight(Weight::grams(221)).with_created_at(now - Duration::days(60)),
        Product::create("s24u", "Samsung Galaxy S24 Ultra", Money::vnd(27_490_000))
            .with_original_price(Money::vnd(33_990_000)).with_category("phone").with_brand("Samsung")
            .with_description("Galaxy AI, bút S Pen, camera 200MP").with_rating(4.7, 860).with_sold(2100).with_stock(30)
            .with_tags(["5G", "flagship", "s-pen"]).with_spec("Màn hình", "6.8 inch")
            .with_image("/images/s24u.jpg").with_weight(Weight::grams(232)).with_created_at(now - Duration::days(45)),
        Product::create("redmi13", "Xiaomi Redmi Note 13", Money::vnd(4_890_000))
            .with_category("phone").with_brand("Xiaomi").with_description("Pin 5000mAh, sạc nhanh 33W")
            .with_rating(4.4, 540).with_sold(5400).with_stock(120).with_tags(["giá rẻ", "pin trâu"])
            .with_image("/images/redmi13.jpg").with_weight(Weight::grams(188)).with_created_at(now - Duration::days(90)),
        Product::create("mba-m3", "MacBook Air M3 13 inch", Money::vnd(27_990_000))
            .with_category("laptop").with_brand("Apple").with_description("Chip M3, mỏng nhẹ, pin 18 giờ")
            .with_rating(4.9, 410).with_sold(900).with_stock(12).with_tags(["văn phòng", "mỏng nhẹ"])
            .with_spec("CPU", "Apple M3").with_image("/images/mba-m3.jpg").with_weight(Weight::grams(1_240))
            .with_created_at(now - Duration::days(20)),
        Product::create("rog-g16", "ASUS ROG Strix G16", Money::vnd(35_490_000))
            .with_original_price(Money::vnd(39_990_000)).with_category("laptop").with_brand("ASUS")
            .with_description("Laptop gaming RTX 4060, màn 165Hz").with_rating(4.6, 150).with_sold(300).with_stock(0)
            .with_tags(["gaming", "rtx"]).with_image("/images/rog-g16.jpg").with_weight(Weight::grams(2_500))
            .with_created_at(now - Duration::days(15)),
        Product::create("ipad-pro", "iPad Pro M4 11 inch", Money::vnd(28_990_000))
            .with_category("tablet").with_brand("Apple").with_description("Màn hình OLED Tandem, chip M4")
            .with_rating(4.8, 95).with_sold(260).with_stock(8).with_tags(["máy tính bảng", "oled"])
            .with_image("/images/ipad-pro.jpg").with_weight(Weight::grams(444)).with_created_at(now - Duration::days(5)),
        Product::create("tab-s9", "Samsung Galaxy Tab S9", Money::vnd(15_990_000))
            .with_original_price(Money::vnd(19_990_000)).with_category("tablet").with_brand("Samsung")
            .with_description("Chống nước IP68, kèm bút S Pen").with_rating(4.5, 120).with_sold(410).with_stock(14)
            .with_tags(["máy tính bảng", "chống nước"]).with_image("/images/tab-s9.jpg").with_weight(Weight::grams(498))
            .with_created_at(now - Duration::days(70)),
        Product::create("airpods-pro2", "AirPods Pro 2", Money::vnd(5_490_000))
            .with_original_price(Money::vnd(6_190_000)).with_category("audio").with_brand("Apple")
            .with_description("Tai nghe chống ồn chủ động, cổng USB-C").with_rating(4.7, 2300).with_sold(7800).with_stock(200)
            .with_tags(["tai nghe", "chống ồn", "bluetooth"]).with_image("/images/airpods-pro2.jpg")
            .with_weight(Weight::grams(51)).with_created_at(now - Duration::days(120)),
        Product::create("wh1000xm5", "Sony WH-1000XM5", Money::vnd(7_990_000))
            .with_category("audio").with_brand("Sony").with_description("Tai nghe chụp tai chống ồn hàng đầu")
            .with_rating(4.8, 640).with_sold(1500).with_stock(25).with_tags(["tai nghe", "chống ồn", "bluetooth"])
            .with_image("/images/wh1000xm5.jpg").with_weight(Weight::grams(250)).with_created_at(now - Duration::days(200)),
        Product::create("jbl-flip6", "Loa JBL Flip 6", Money::vnd(2_490_000))
            .with_original_price(Money::vnd(2_990_000)).with_category("audio").with_brand("JBL")
            .with_description("Loa bluetooth chống nước IP67").with_rating(4.6, 780).with_sold(3100).with_stock(60)
            .with_tags(["loa", "bluetooth", "chống nước"]).with_image("/images/jbl-flip6.jpg")
            .with_weight(Weight::grams(550)).with_created_at(now - Duration::days(150)),
        Product::create("aw-s9", "Apple Watch Series 9", Money::vnd(9_990_000))
            .with_category("watch").with_brand("Apple").with_description("Đồng hồ thông minh, đo nhịp tim, GPS")
            .with_rating(4.7, 380).with_sold(1100).with_stock(3).with_tags(["đồng hồ thông minh", "sức khỏe"])
            .with_image("/images/aw-s9.jpg").with_weight(Weight::grams(39)).with_created_at(now - Duration::days(100)),
        Product::create("anker-10k", "Sạc dự phòng Anker 10000mAh", Money::vnd(590_000))
            .with_original_price(Money::vnd(790_000)).with_category("accessory").with_brand("Anker")
            .with_description("Sạc nhanh PD 20W, nhỏ gọn").with_rating(4.5, 1900).with_sold(12_000).with_stock(500)
            .with_tags(["sạc dự phòng", "sạc nhanh"]).with_image("/images/anker-10k.jpg").with_weight(Weight::grams(190))
            .with_created_at(now - Duration::days(300)),
    ]
}
