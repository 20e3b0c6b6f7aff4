pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod setting;
pub mod user;

pub use address::{Address, AddressPatch, NewAddress};
pub use cart::{Cart, CartItem, CartLine, CartView};
pub use category::{Category, CategoryDetail, CategoryListing, CategoryPatch, NewCategory};
pub use order::{
    NewOrder, NewOrderItem, Order, OrderCustomer, OrderDetail, OrderItem, OrderLine, OrderStatus,
    OrderWithItems, PaymentMethod, PaymentStatus,
};
pub use product::{NewProduct, Product, ProductDetail, ProductFilter, ProductImage, ProductListing, ProductPatch};
pub use review::{NewReview, Review, ReviewAuthor, ReviewPatch, ReviewWithAuthor};
pub use setting::{Setting, SettingType};
pub use user::{NewUser, Role, User, UserPatch, UserProfile};

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in patch payloads. Use with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
