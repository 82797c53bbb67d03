//! Reference data the storefront ships with: the product range, the shop directory, the
//! named areas of the shop finder and the courier roster.

use crate::model::{Area, Courier, Location, Product, Shop};

/// Where every order is dispatched from.
pub const SHOP_LOCATION: Location = Location::new(28.5355, 77.2167);

/// Where every order is delivered to.
pub const CUSTOMER_LOCATION: Location = Location::new(28.5412, 77.2198);

pub const ESTIMATED_DELIVERY: &str = "30-45 minutes";

pub fn products() -> Vec<Product> {
    vec![
        Product::new(1, "Fresh Tomatoes", 40.0, "kg", "Vegetables")
            .with_image("https://images.unsplash.com/photo-1546470427-227c7369a9b1"),
        Product::new(2, "Organic Bananas", 60.0, "dozen", "Fruits")
            .with_image("https://images.unsplash.com/photo-1543218024-57a70143c369"),
        Product::new(3, "Brown Eggs", 80.0, "dozen", "Dairy")
            .with_image("https://images.unsplash.com/photo-1582722872445-44dc5f7e3c8f"),
        Product::new(4, "Ginger-Garlic Paste", 45.0, "jar", "Spices")
            .with_image("https://images.unsplash.com/photo-1615485290382-441e4d049cb5"),
        Product::new(5, "Garam Masala", 65.0, "pack", "Spices")
            .with_image("https://images.unsplash.com/photo-1596040033229-a9821ebd058d"),
        Product::new(6, "Fresh Spinach", 30.0, "bunch", "Vegetables")
            .with_image("https://images.unsplash.com/photo-1576045057995-568f588f82fb"),
        Product::new(7, "Paneer", 120.0, "pack", "Dairy")
            .with_image("https://images.unsplash.com/photo-1631452180519-c014fe946bc7"),
        Product::new(8, "Basmati Rice", 150.0, "kg", "Grains")
            .with_image("https://images.unsplash.com/photo-1586201375761-83865001e31c"),
    ]
}

pub fn product(id: u32) -> Option<Product> {
    products().into_iter().find(|p| p.id.0 == id)
}

const UNSPLASH: &str = "https://images.unsplash.com/";

fn shop(id: u32, name: &str, address: &str, timing: &str, at: (f64, f64), photo: &str) -> Shop {
    Shop {
        id,
        name: name.to_string(),
        address: address.to_string(),
        timing: timing.to_string(),
        coordinates: Location::new(at.0, at.1),
        image: format!("{UNSPLASH}{photo}"),
    }
}

pub fn shops() -> Vec<Shop> {
    vec![
        shop(
            1,
            "Krishna Grocery Store",
            "23, Malviya Nagar Market",
            "7:00 AM - 10:00 PM",
            (28.5355, 77.2167),
            "photo-1604719312566-8912e9227c6a",
        ),
        shop(
            2,
            "Sharma General Store",
            "Shop 5, DDA Market",
            "8:00 AM - 9:30 PM",
            (28.5375, 77.2189),
            "photo-1515706886582-54c73c5eaf41",
        ),
        shop(
            3,
            "New Delhi Supermart",
            "45, Community Center",
            "8:30 AM - 9:00 PM",
            (28.5392, 77.2145),
            "photo-1602665742701-389671bc40c0",
        ),
        shop(
            4,
            "Gupta Brothers Store",
            "12, Main Market Road",
            "7:30 AM - 10:00 PM",
            (28.5412, 77.2198),
            "photo-1631651363531-ee7f0f30cd88",
        ),
    ]
}

pub const AREAS: [Area; 8] = [
    Area {
        name: "Malviya Nagar",
        coordinates: Location::new(28.5355, 77.2167),
    },
    Area {
        name: "Connaught Place",
        coordinates: Location::new(28.6289, 77.2074),
    },
    Area {
        name: "Lajpat Nagar",
        coordinates: Location::new(28.5700, 77.2400),
    },
    Area {
        name: "Karol Bagh",
        coordinates: Location::new(28.6619, 77.1905),
    },
    Area {
        name: "Dwarka",
        coordinates: Location::new(28.5823, 77.0500),
    },
    Area {
        name: "Rohini",
        coordinates: Location::new(28.7400, 77.1200),
    },
    Area {
        name: "Vasant Kunj",
        coordinates: Location::new(28.5200, 77.1500),
    },
    Area {
        name: "Greater Kailash",
        coordinates: Location::new(28.5500, 77.2400),
    },
];

pub fn area(name: &str) -> Option<Area> {
    AREAS
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .copied()
}

/// Couriers orders are assigned from. Each starts at the shop.
pub fn couriers() -> Vec<Courier> {
    vec![Courier {
        id: "dp1".to_string(),
        name: "Rajesh Kumar".to_string(),
        phone: "+919876543210".to_string(),
        image: "https://images.unsplash.com/photo-1633332755192-727a05c4013d".to_string(),
        location: SHOP_LOCATION,
        rating: 4.8,
        total_deliveries: 1458,
    }]
}
