//! Data models matching the document store schema

pub mod cart;
pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod settings;
pub mod user;

pub use cart::{Cart, CartItem};
pub use order::{
    BillingAddress, Customization, Order, OrderId, OrderItem, OrderStatus, PaymentMethod,
    ShippingAddress,
};
pub use product::{
    Audience, Category, ColorOption, ImageRef, Product, ProductCreate, ProductId, ProductUpdate,
    SizeStock,
};
pub use settings::StoreSettings;
pub use user::{Address, PublicUser, Role, User, UserId, UserUpdate};
