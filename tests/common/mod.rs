#![allow(dead_code)]

use axum::Router;
use gift_shop_admin::gifts::{Gift, GiftForm, ImageData, Photo};
use gift_shop_admin::models::{Id, PersonRef};
use gift_shop_admin::orders::{GiftRef, Order, OrderStatus};
use gift_shop_admin::users::{Role, User, UserForm, full_name};
use tokio::net::TcpListener;

pub fn user(id: Id, login: &str, first: &str, last: &str, role: Role) -> User {
    User {
        id,
        login: login.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        middle_name: None,
        full_name: full_name(first, last, None),
        email: format!("{}@mail.ru", login),
        birth_date: "12.09.2002".to_string(),
        role,
        coins: 0,
    }
}

pub fn sample_users() -> Vec<User> {
    let mut kosse = user(2, "kosse", "Ivan", "Kosse", Role::Student);
    kosse.middle_name = Some("Nikolaevich".to_string());
    kosse.full_name = full_name("Ivan", "Kosse", Some("Nikolaevich"));

    let mut sokolov = user(4, "sokolov", "Mikhail", "Sokolov", Role::Student);
    sokolov.coins = 23;

    vec![
        user(1, "ivanov", "Artem", "Ivanov", Role::Student),
        kosse,
        user(3, "petrov", "Petr", "Petrov", Role::Teacher),
        sokolov,
    ]
}

pub fn user_form(login: &str, email: &str) -> UserForm {
    UserForm {
        login: login.to_string(),
        password: "secret".to_string(),
        first_name: "Anna".to_string(),
        last_name: "Smirnova".to_string(),
        middle_name: String::new(),
        role: Role::Student,
        email: email.to_string(),
        birth_date: "01.03.2005".to_string(),
    }
}

pub fn person(id: Id, full_name: &str) -> PersonRef {
    PersonRef::new(id, full_name)
}

pub fn jpeg(name: &str) -> ImageData {
    ImageData::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF]).expect("jpeg is supported")
}

pub fn gift_form(name: &str, price: u32, stock: u32, images: usize) -> GiftForm {
    GiftForm {
        name: name.to_string(),
        price,
        stock,
        photos: (0..images)
            .map(|i| Photo::Local(jpeg(&format!("img{}.jpg", i))))
            .collect(),
    }
}

pub fn sample_gifts() -> Vec<Gift> {
    vec![
        Gift {
            id: 1,
            name: "Hoodie".to_string(),
            price: 100,
            stock: 5,
            photos: vec![Photo::Remote(11)],
        },
        Gift {
            id: 2,
            name: "Hoodie".to_string(),
            price: 100,
            stock: 3,
            photos: vec![Photo::Remote(12)],
        },
        Gift {
            id: 5,
            name: "T-shirt".to_string(),
            price: 50,
            stock: 20,
            photos: vec![Photo::Remote(13)],
        },
    ]
}

pub fn order(id: Id, status: OrderStatus, date: &str, customer: PersonRef) -> Order {
    Order {
        id,
        gift: GiftRef {
            id: 1,
            name: "Hoodie".to_string(),
            photo_id: Some(11),
        },
        customer,
        order_date: date.to_string(),
        status,
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read test listener address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .unwrap_or_else(|e| panic!("Test server at {} failed: {}", addr, e));
    });
    format!("http://{}", addr)
}
